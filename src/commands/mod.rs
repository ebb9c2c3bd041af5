pub mod inspect;
pub mod run;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;

/// File extensions accepted by `--file`, compared case-insensitively.
const SOURCE_EXTENSIONS: [&str; 2] = ["bf", "b"];

/// Where a command takes its program from.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Read Brainfuck code from PATH (.bf or .b) instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,
}

/// Why the program text could not be loaded.
#[derive(Debug)]
pub enum SourceError {
    /// Bad combination of arguments; the caller prints its usage.
    Usage,
    /// Already reported on stderr; exit with this status.
    Failed(i32),
}

/// Produce the program text from `--file` or the positional parts.
pub fn load_source(program: &str, args: SourceArgs) -> Result<String, SourceError> {
    let SourceArgs { file, code } = args;

    if file.is_none() && code.is_empty() {
        return Err(SourceError::Usage);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        return Err(SourceError::Usage);
    }

    let Some(path) = file else {
        return Ok(code.join(""));
    };

    if !has_source_extension(&path) {
        eprintln!(
            "{program}: unsupported file extension for '{}' (expected .bf or .b)",
            path.display()
        );
        let _ = io::stderr().flush();
        return Err(SourceError::Failed(2));
    }

    if !path.is_file() {
        eprintln!("{program}: file not found: {}", path.display());
        let _ = io::stderr().flush();
        return Err(SourceError::Failed(1));
    }

    match fs::read_to_string(&path) {
        Ok(s) => {
            tracing::debug!(path = %path.display(), bytes = s.len(), "loaded program file");
            Ok(s)
        }
        Err(e) => {
            eprintln!("{program}: failed to read code file as UTF-8: {e}");
            let _ = io::stderr().flush();
            Err(SourceError::Failed(1))
        }
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bf_and_b_in_any_case() {
        assert!(has_source_extension(Path::new("hello.bf")));
        assert!(has_source_extension(Path::new("dir/HELLO.BF")));
        assert!(has_source_extension(Path::new("prog.b")));
        assert!(!has_source_extension(Path::new("prog.txt")));
        assert!(!has_source_extension(Path::new("bf")));
    }

    #[test]
    fn positional_parts_are_concatenated() {
        let args = SourceArgs {
            file: None,
            code: vec!["++".into(), "[-]".into()],
        };
        assert_eq!(load_source("brainfudge", args).unwrap(), "++[-]");
    }

    #[test]
    fn file_and_code_together_is_a_usage_error() {
        let args = SourceArgs {
            file: Some(PathBuf::from("x.bf")),
            code: vec!["+".into()],
        };
        assert!(matches!(load_source("brainfudge", args), Err(SourceError::Usage)));
    }

    #[test]
    fn missing_file_fails_with_status_one() {
        let args = SourceArgs {
            file: Some(PathBuf::from("/definitely/not/here.bf")),
            code: Vec::new(),
        };
        assert!(matches!(load_source("brainfudge", args), Err(SourceError::Failed(1))));
    }
}
