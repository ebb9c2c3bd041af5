//! Character I/O capability handed to the executor.
//!
//! The executor only knows [`CharIo`]. Where the bytes come from (a pipe, a
//! raw-mode terminal, an in-memory buffer) is up to the implementation.

use std::io::{self, Read, Write};

/// Blocking single-character input and unbuffered single-byte output.
pub trait CharIo {
    /// Read one character. Line terminators and end of input read as 0.
    fn read_char(&mut self) -> io::Result<u8>;

    /// Write one byte and flush it.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
}

impl<T: CharIo + ?Sized> CharIo for Box<T> {
    fn read_char(&mut self) -> io::Result<u8> {
        (**self).read_char()
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }
}

impl<T: CharIo + ?Sized> CharIo for &mut T {
    fn read_char(&mut self) -> io::Result<u8> {
        (**self).read_char()
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }
}

/// [`CharIo`] over any byte reader and writer.
///
/// Used for piped stdin/stdout and for in-memory buffers in tests.
pub struct StreamIo<R, W> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> StreamIo<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl StreamIo<io::Stdin, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: Read, W: Write> CharIo for StreamIo<R, W> {
    fn read_char(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                // EOF
                Ok(0) => return Ok(0),
                Ok(_) => {
                    return Ok(match buf[0] {
                        b'\n' | b'\r' => 0,
                        byte => byte,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.write_all(&[byte])?;
        self.output.flush()
    }
}
