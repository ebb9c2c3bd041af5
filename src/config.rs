//! Interpreter settings.
//!
//! Each field is resolved on its own, first match wins:
//! command-line flag, then environment variable, then
//! `$XDG_CONFIG_HOME/brainfudge.toml`, then the built-in default.
//!
//! The config file is TOML:
//!
//! ```toml
//! [interpreter]
//! tape_size = 65536
//! dump_memory = true
//! max_steps = 1000000
//! timeout_ms = 5000
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use cross_xdg::BaseDirs;
use serde::Deserialize;
use toml::{Table, Value};

use crate::tape::DEFAULT_TAPE_SIZE;

pub const ENV_TAPE_SIZE: &str = "BRAINFUDGE_TAPE_SIZE";
pub const ENV_DUMP: &str = "BRAINFUDGE_DUMP";
pub const ENV_MAX_STEPS: &str = "BRAINFUDGE_MAX_STEPS";
pub const ENV_TIMEOUT_MS: &str = "BRAINFUDGE_TIMEOUT_MS";

const CONFIG_FILE: &str = "brainfudge.toml";
const CONFIG_SECTION: &str = "interpreter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of cells; never 0.
    pub tape_size: usize,
    /// Print the memory dump after a successful run.
    pub dump_memory: bool,
    /// Abort after this many executed nodes.
    pub max_steps: Option<usize>,
    /// Abort after this much wall-clock time.
    pub timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            dump_memory: false,
            max_steps: None,
            timeout_ms: None,
        }
    }
}

/// Values given on the command line; `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tape_size: Option<usize>,
    pub dump_memory: bool,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// Layout of `brainfudge.toml`. Other tables are ignored.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    interpreter: Table,
}

/// Settings read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FileSettings {
    tape_size: Option<usize>,
    dump_memory: Option<bool>,
    max_steps: Option<usize>,
    timeout_ms: Option<u64>,
}

impl Config {
    /// Resolve against the real environment and config file.
    pub fn resolve(flags: &Overrides) -> Self {
        let file = load_file().unwrap_or_default();
        Self::resolve_from(flags, |key| std::env::var(key).ok(), &file)
    }

    fn resolve_from<E>(flags: &Overrides, env: E, file: &FileSettings) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let tape_size = flags
            .tape_size
            .or_else(|| env_value(&env, ENV_TAPE_SIZE, parse_positive))
            .or(file.tape_size)
            .unwrap_or(defaults.tape_size);

        let dump_memory = flags.dump_memory
            || env_value(&env, ENV_DUMP, parse_bool)
                .or(file.dump_memory)
                .unwrap_or(defaults.dump_memory);

        let max_steps = flags
            .max_steps
            .or_else(|| env_value(&env, ENV_MAX_STEPS, parse_positive))
            .or(file.max_steps);

        let timeout_ms = flags
            .timeout_ms
            .or_else(|| env_value(&env, ENV_TIMEOUT_MS, |s| parse_positive(s).map(|n| n as u64)))
            .or(file.timeout_ms);

        Self {
            tape_size,
            dump_memory,
            max_steps,
            timeout_ms,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// clap value parser for tape sizes and step limits: a positive integer.
pub fn parse_count(s: &str) -> Result<usize, String> {
    parse_positive(s).ok_or_else(|| format!("'{s}' is not a positive integer"))
}

/// clap value parser for timeouts: a positive number of milliseconds.
pub fn parse_millis(s: &str) -> Result<u64, String> {
    s.parse::<u64>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| format!("'{s}' is not a positive number of milliseconds"))
}

fn env_value<E, T>(env: &E, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T>
where
    E: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!("ignoring {key}={raw:?}: invalid value");
    }
    parsed
}

fn parse_positive(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|&n| n > 0)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let config_home = base_dirs.config_home();

    let mut path = PathBuf::from(config_home);
    path.push(CONFIG_FILE);
    Some(path)
}

fn load_file() -> Option<FileSettings> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Some(parse_file(&content))
}

/// Read the `[interpreter]` table. A file that is not valid TOML is
/// ignored as a whole; a bad value only drops its own key.
fn parse_file(content: &str) -> FileSettings {
    let file: ConfigFile = match toml::from_str(content) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("ignoring config file: {e}");
            return FileSettings::default();
        }
    };

    let mut settings = FileSettings::default();
    for (key, value) in &file.interpreter {
        match key.as_str() {
            "tape_size" => settings.tape_size = positive_value(value).or_else(|| invalid(key, value)),
            "dump_memory" => settings.dump_memory = bool_value(value).or_else(|| invalid(key, value)),
            "max_steps" => settings.max_steps = positive_value(value).or_else(|| invalid(key, value)),
            "timeout_ms" => {
                settings.timeout_ms = positive_value(value)
                    .map(|n| n as u64)
                    .or_else(|| invalid(key, value));
            }
            _ => tracing::warn!("ignoring unknown config key {key:?}"),
        }
    }
    settings
}

/// Integers, or strings holding one, must be positive.
fn positive_value(value: &Value) -> Option<usize> {
    match value {
        Value::Integer(n) => usize::try_from(*n).ok().filter(|&n| n > 0),
        Value::String(s) => parse_positive(s.trim()),
        _ => None,
    }
}

/// Booleans, or strings `parse_bool` accepts.
fn bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        Value::String(s) => parse_bool(s.trim()),
        _ => None,
    }
}

fn invalid<T>(key: &str, value: &Value) -> Option<T> {
    tracing::warn!("ignoring config key {key:?}: invalid value {value}");
    None
}
