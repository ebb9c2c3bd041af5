//! Interactive terminal input.
//!
//! A read puts the terminal in raw mode (no echo, no line buffering) for
//! exactly as long as it waits for one key. [`RawModeGuard`] restores the
//! previous mode when it drops, and the interrupt handler restores it when
//! the process is killed by SIGINT outside a read.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::io::CharIo;

/// Exit status used when the user interrupts a run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Holds raw mode for its lifetime.
pub struct RawModeGuard {
    was_raw: bool,
}

impl RawModeGuard {
    pub fn enter() -> io::Result<Self> {
        let was_raw = terminal::is_raw_mode_enabled()?;
        if !was_raw {
            terminal::enable_raw_mode()?;
        }
        Ok(Self { was_raw })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_raw {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Leave raw mode if it is on. Safe to call at any time.
pub fn restore() {
    if matches!(terminal::is_raw_mode_enabled(), Ok(true)) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Install the SIGINT handler: restore the terminal, flush, exit 130.
///
/// Can only be installed once per process.
pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        restore();
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}

/// [`CharIo`] reading single key presses from the terminal.
///
/// Keys are not echoed. Enter and Ctrl+D read as 0; Ctrl+C fails the read
/// with [`io::ErrorKind::Interrupted`].
pub struct TerminalIo<W> {
    output: W,
}

impl<W: Write> TerminalIo<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }
}

impl TerminalIo<io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CharIo for TerminalIo<W> {
    fn read_char(&mut self) -> io::Result<u8> {
        let _raw = RawModeGuard::enter()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(byte) = key_to_byte(key)? {
                    return Ok(byte);
                }
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.write_all(&[byte])?;
        self.output.flush()
    }
}

/// Translate a key event into the byte stored in the cell.
///
/// `Ok(None)` means the key produces no character and the read keeps waiting.
fn key_to_byte(key: KeyEvent) -> io::Result<Option<u8>> {
    if key.kind == KeyEventKind::Release {
        return Ok(None);
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Err(io::Error::new(
            io::ErrorKind::Interrupted,
            "interrupted by Ctrl+C",
        )),
        KeyCode::Char('d') if ctrl => Ok(Some(0)),
        KeyCode::Enter => Ok(Some(0)),
        KeyCode::Tab => Ok(Some(b'\t')),
        KeyCode::Backspace => Ok(Some(0x08)),
        KeyCode::Esc => Ok(Some(0x1B)),
        KeyCode::Char(c) if c.is_ascii() => Ok(Some(c as u8)),
        _ => Ok(None),
    }
}
