use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;

use brainfudge::config::{Config, Overrides, parse_count, parse_millis};
use brainfudge::terminal::{self, INTERRUPTED_EXIT_CODE};
use brainfudge::{CharIo, Error, Executor, Program, RuntimeError, StepControl, StreamIo, Tape, TerminalIo};
use clap::Args;

use super::{SourceArgs, SourceError, load_source};
use crate::cli_util::{print_error, print_message};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Number of tape cells (fallback BRAINFUDGE_TAPE_SIZE; default 32768)
    #[arg(short = 'c', long = "cells", value_name = "N", value_parser = parse_count)]
    pub cells: Option<usize>,

    /// Print the memory dump after a successful run
    #[arg(short = 'd', long = "dump")]
    pub dump: bool,

    /// Maximum interpreter steps before abort (fallback BRAINFUDGE_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N", value_parser = parse_count)]
    pub max_steps: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BRAINFUDGE_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS", value_parser = parse_millis)]
    pub timeout_ms: Option<u64>,

    /// Write a step-by-step table of operations to stderr
    #[arg(long = "debug")]
    pub debug: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Counts the bytes the program writes, to decide on the trailing newline.
struct CountingIo<I> {
    inner: I,
    written: usize,
}

impl<I: CharIo> CharIo for CountingIo<I> {
    fn read_char(&mut self) -> io::Result<u8> {
        self.inner.read_char()
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.inner.write_byte(byte)?;
        self.written += 1;
        Ok(())
    }
}

type Outcome = (Result<(), RuntimeError>, Tape, usize);

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        cells,
        dump,
        max_steps,
        timeout_ms,
        debug,
        source,
        ..
    } = args;

    let code_str = match load_source(program, source) {
        Ok(s) => s,
        Err(SourceError::Usage) => usage_and_exit(program, 2),
        Err(SourceError::Failed(code)) => return code,
    };

    // Resolve settings: flags -> env -> config file -> defaults
    let config = Config::resolve(&Overrides {
        tape_size: cells,
        dump_memory: dump,
        max_steps,
        timeout_ms,
    });
    tracing::debug!(?config, "resolved configuration");

    let compiled = match Program::compile(&code_str) {
        Ok(p) => p,
        Err(e) => {
            print_error(Some(program), &code_str, &Error::from(e));
            return 1;
        }
    };

    let tape = match Tape::new(config.tape_size) {
        Ok(t) => t,
        Err(e) => {
            print_error(Some(program), &code_str, &Error::from(e));
            return 1;
        }
    };

    if let Err(e) = terminal::install_interrupt_handler() {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<Outcome>();
    let control = StepControl::new(config.max_steps, cancel.clone());

    thread::spawn(move || {
        let io: Box<dyn CharIo + Send> = if io::stdin().is_terminal() {
            Box::new(TerminalIo::stdio())
        } else {
            Box::new(StreamIo::stdio())
        };
        let io = CountingIo { inner: io, written: 0 };

        let mut executor = Executor::new(compiled.tree(), tape, io).with_control(control);
        if debug {
            executor = executor.with_trace(io::stderr());
        }
        let res = executor.run();
        let (tape, io) = executor.into_parts();
        let _ = tx.send((res, tape, io.written));
    });

    let outcome = match config.timeout() {
        Some(timeout) => match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                terminal::restore();
                return timed_out(config.timeout_ms.unwrap_or_default());
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => return 1,
        },
        None => match rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => return 1,
        },
    };

    let (result, tape, written) = outcome;

    if written > 0 && io::stdout().is_terminal() {
        // Keep the shell prompt off the program's last line
        println!();
    }

    let exit_code = match result {
        Ok(()) => {
            if config.dump_memory {
                print!("{}", tape.dump());
            }
            0
        }
        Err(RuntimeError::Interrupted) => {
            terminal::restore();
            print_message(&RuntimeError::Interrupted.to_string());
            INTERRUPTED_EXIT_CODE
        }
        Err(RuntimeError::Cancelled) => timed_out(config.timeout_ms.unwrap_or_default()),
        Err(e) => {
            print_error(Some(program), &code_str, &Error::from(e));
            1
        }
    };

    let _ = io::stdout().flush();
    exit_code
}

fn timed_out(timeout_ms: u64) -> i32 {
    print_message(&format!(
        "Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)"
    ));
    1
}

pub fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH (.bf or .b) instead of positional "<code>"
  --cells, -c <N>     Number of tape cells (default 32768)
  --dump,  -d         Print the memory dump after a successful run
  --max-steps <N>     Abort after N interpreter steps
  --timeout <MS>      Abort after MS milliseconds of wall-clock time
  --debug             Write a step-by-step table of operations to stderr
  --help,  -h         Show this help

Environment:
  BRAINFUDGE_TAPE_SIZE, BRAINFUDGE_DUMP, BRAINFUDGE_MAX_STEPS, BRAINFUDGE_TIMEOUT_MS
  Settings may also live in $XDG_CONFIG_HOME/brainfudge.toml under [interpreter].

Notes:
- Any characters outside of Brainfuck's ><+-.,[] are comments.
- Input (`,`) reads one character; newline or end of input stores 0.
- Moving the pointer past either end of the tape leaves it in place.
- Options go before the code; everything after the first code part is code.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
