mod cli_util;
mod commands;
mod theme;

use std::env;
use std::io::{self, Write};
use std::path::Path;

use clap::{Parser, Subcommand};

use crate::commands::inspect::{self, InspectArgs};
use crate::commands::run::{self, RunArgs};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run    [OPTIONS] "<code>"       # Run Brainfuck code (args are concatenated)
  {0} run    [OPTIONS] --file <PATH>  # Run Brainfuck code loaded from a .bf/.b file
  {0} tokens "<code>"                 # Print the command symbols, comments removed
  {0} tree   "<code>"                 # Print the parsed syntax tree

Global options:
  --verbose      Log debug diagnostics to stderr (or set BRAINFUDGE_LOG)
  --help,  -h    Show this help

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "brainfudge", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Log debug diagnostics to stderr
    #[arg(long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Tokens(InspectArgs),
    Tree(InspectArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| String::from("brainfudge"));

    let cli = Cli::parse();
    cli_util::init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => run::run(&program, args),
        Command::Tokens(args) => inspect::tokens(&program, args),
        Command::Tree(args) => inspect::tree(&program, args),
    };

    std::process::exit(code);
}
