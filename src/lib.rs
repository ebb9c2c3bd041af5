//! A tree-walking Brainfuck interpreter.
//!
//! Programs go through three stages:
//!
//! 1. [`lexer::tokenize`] keeps the eight command symbols `><+-.,[]` and drops
//!    everything else as comments.
//! 2. [`parser::parse`] builds an arena [`SyntaxTree`] in which every loop
//!    node owns its body as children. Unbalanced brackets are reported as a
//!    [`SyntaxError`] before anything runs.
//! 3. [`Executor`] walks the tree iteratively over a [`Tape`] of wrapping
//!    byte cells with a clamped pointer, doing I/O through a [`CharIo`].
//!
//! Behaviors:
//! - The tape holds 32,768 cells by default, all initialized to 0.
//! - Moving the pointer past either end of the tape leaves it where it is.
//! - `+` and `-` wrap modulo 256.
//! - `,` reads one character; a newline or end of input stores 0.
//! - `.` writes the current cell as a raw byte and flushes it.
//!
//! Quick start:
//!
//! ```no_run
//! use brainfudge::{StreamIo, run_source};
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let tape = run_source(code, 32_768, StreamIo::stdio()).expect("program should run");
//! print!("{}", tape.dump());
//! ```

pub mod config;
pub mod executor;
pub mod io;
pub mod lexer;
pub mod parser;
pub mod tape;
pub mod terminal;
pub mod tree;

pub use config::Config;
pub use executor::{Executor, RuntimeError, StepControl};
pub use io::{CharIo, StreamIo};
pub use lexer::{Token, TokenStream, tokenize};
pub use parser::{SyntaxError, parse};
pub use tape::{DEFAULT_TAPE_SIZE, MemoryDump, ResourceError, Tape};
pub use terminal::TerminalIo;
pub use tree::{NodeId, NodeKind, SyntaxTree};

/// Any failure between source text and a finished run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// A lexed and parsed program, ready to run any number of times.
#[derive(Debug, Clone)]
pub struct Program {
    tokens: TokenStream,
    tree: SyntaxTree,
}

impl Program {
    pub fn compile(source: &str) -> Result<Self, SyntaxError> {
        let tokens = tokenize(source);
        let tree = parse(&tokens)?;
        Ok(Self { tokens, tree })
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Run on a fresh tape of `tape_size` cells and return the final tape.
    pub fn run<I: CharIo>(&self, tape_size: usize, io: I) -> Result<Tape, Error> {
        let tape = Tape::new(tape_size)?;
        let mut executor = Executor::new(&self.tree, tape, io);
        executor.run()?;
        let (tape, _) = executor.into_parts();
        Ok(tape)
    }
}

/// Compile and run `source` in one go.
///
/// Syntax errors are reported before the tape is allocated, so an invalid
/// program never produces output.
pub fn run_source<I: CharIo>(source: &str, tape_size: usize, io: I) -> Result<Tape, Error> {
    Program::compile(source)?.run(tape_size, io)
}
