use std::io::{self, Write};

use brainfudge::{Error, Program, tokenize};
use clap::Args;

use super::{SourceArgs, SourceError, load_source};
use crate::cli_util::print_error;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Print the command symbols the lexer keeps, on one line.
pub fn tokens(program: &str, args: InspectArgs) -> i32 {
    if args.help {
        usage_and_exit(program, "tokens", 0);
    }

    let code_str = match load_source(program, args.source) {
        Ok(s) => s,
        Err(SourceError::Usage) => usage_and_exit(program, "tokens", 2),
        Err(SourceError::Failed(code)) => return code,
    };

    println!("{}", tokenize(&code_str));
    let _ = io::stdout().flush();
    0
}

/// Print the parsed syntax tree, or the syntax error that prevents parsing.
pub fn tree(program: &str, args: InspectArgs) -> i32 {
    if args.help {
        usage_and_exit(program, "tree", 0);
    }

    let code_str = match load_source(program, args.source) {
        Ok(s) => s,
        Err(SourceError::Usage) => usage_and_exit(program, "tree", 2),
        Err(SourceError::Failed(code)) => return code,
    };

    match Program::compile(&code_str) {
        Ok(compiled) => {
            print!("{}", compiled.tree());
            let _ = io::stdout().flush();
            0
        }
        Err(e) => {
            print_error(Some(program), &code_str, &Error::from(e));
            1
        }
    }
}

fn usage_and_exit(program: &str, command: &str, code: i32) -> ! {
    let description = match command {
        "tokens" => "Print the Brainfuck commands found in the code, comments removed.",
        _ => "Print the syntax tree, one node per line, loop bodies indented.",
    };
    eprintln!(
        r#"Usage:
  {0} {1} "<code>"
  {0} {1} --file <PATH>

Options:
  --file, -f <PATH>  Read Brainfuck code from PATH (.bf or .b) instead of positional "<code>"
  --help, -h         Show this help

Description:
  {2}
"#,
        program, command, description
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
