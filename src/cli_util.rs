use std::io::{self, IsTerminal, Write};

use brainfudge::{Error, RuntimeError};
use nu_ansi_term::Style;
use tracing_subscriber::EnvFilter;

use crate::theme::catppuccin::Mocha as P;

/// Env var holding a tracing filter directive, e.g. `BRAINFUDGE_LOG=debug`.
pub const LOG_ENV: &str = "BRAINFUDGE_LOG";

/// Route tracing output to stderr. `verbose` lowers the default level to debug.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Pretty-print a structured [`Error`].
/// If `program` is `Some("brainfudge")`, prefix messages with "brainfudge: ...".
pub fn print_error(program: Option<&str>, code: &str, err: &Error) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        Error::Syntax(e) => {
            let msg = prefix_program(&format!("Parse error: unmatched bracket {}", e.bracket()));
            print_error_with_context(&msg, code, e.offset());
        }
        Error::Resource(e) => print_message(&prefix_program(&format!("Resource error: {e}"))),
        Error::Runtime(RuntimeError::Io { source, .. }) => {
            print_message(&prefix_program(&format!("I/O error: {source}")))
        }
        Error::Runtime(e) => print_message(&prefix_program(&e.to_string())),
    }
}

/// One diagnostic line on stderr, styled when stderr is a terminal.
pub fn print_message(msg: &str) {
    eprintln!("{}", paint(msg, Style::new().fg(P::RED).bold()));
    let _ = io::stderr().flush();
}

/// Print a concise error with line/column and a caret under the offending
/// character. `pos` is a char offset into `code`.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    let (line_no, column, line) = locate(code, pos);
    eprintln!(
        "{} at line {line_no}, column {}",
        paint(prefix, Style::new().fg(P::RED).bold()),
        column + 1
    );

    // Show a short window of the line around the position
    const WINDOW_CHARS: usize = 32;

    let total_chars = line.chars().count();
    let start_char = column.saturating_sub(WINDOW_CHARS);
    let end_char = (column + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(line, start_char);
    let end_byte = char_to_byte_index(line, end_char);
    let slice = &line[start_byte..end_byte];

    eprintln!("  {}", paint(slice, Style::new().fg(P::SURFACE2)));

    // Caret under the exact position
    let underline = format!("{}^", " ".repeat(column - start_char));
    eprintln!("  {}", paint(&underline, Style::new().fg(P::PEACH).bold()));
    let _ = io::stderr().flush();
}

fn paint(text: &str, style: Style) -> String {
    if io::stderr().is_terminal() {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

/// Find the 1-based line number, 0-based column and text of the line that
/// holds char offset `pos`.
fn locate(code: &str, pos: usize) -> (usize, usize, &str) {
    let mut line_start = 0usize;
    for (index, raw) in code.split('\n').enumerate() {
        let len = raw.chars().count();
        if pos < line_start + len {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            return (index + 1, pos - line_start, line);
        }
        // +1 for the '\n'
        line_start += len + 1;
    }
    (1, 0, "")
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}
