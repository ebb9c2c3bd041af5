//! The memory tape: a fixed run of wrapping byte cells and a clamped pointer.

use std::fmt;

/// Cell count used when nothing else is configured.
pub const DEFAULT_TAPE_SIZE: usize = 32_768;

/// Errors that can occur while obtaining interpreter storage.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The tape could not be allocated.
    #[error("could not allocate a tape of {cells} cells")]
    AllocationFailure {
        cells: usize,
        #[source]
        source: std::collections::TryReserveError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
}

impl Tape {
    /// Allocate `size` zeroed cells with the pointer at cell 0.
    ///
    /// `size` must be at least 1; configuration rejects 0 before it gets
    /// here, and a zero request is raised to one cell.
    pub fn new(size: usize) -> Result<Self, ResourceError> {
        let size = size.max(1);
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(size)
            .map_err(|source| ResourceError::AllocationFailure { cells: size, source })?;
        cells.resize(size, 0);
        tracing::debug!(cells = size, "allocated tape");
        Ok(Self { cells, pointer: 0 })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a tape holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn set_current(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    /// Move right unless already on the last cell.
    pub fn move_right(&mut self) {
        if self.pointer + 1 < self.cells.len() {
            self.pointer += 1;
        }
    }

    /// Move left unless already on cell 0.
    pub fn move_left(&mut self) {
        self.pointer = self.pointer.saturating_sub(1);
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
    }

    /// Printable view of every cell index and value.
    pub fn dump(&self) -> MemoryDump<'_> {
        MemoryDump { tape: self }
    }
}

/// Two aligned rows: cell indices, then cell values.
///
/// Every entry is right-aligned to the digit count of the tape size, but
/// never narrower than 3 columns, and followed by a single space.
pub struct MemoryDump<'a> {
    tape: &'a Tape,
}

impl MemoryDump<'_> {
    const INDEX_LABEL: &'static str = "Cell Num:";
    const VALUE_LABEL: &'static str = "Cell Contents:";
    const LABEL_WIDTH: usize = 16;

    pub fn column_width(&self) -> usize {
        self.tape.len().to_string().len().max(3)
    }
}

impl fmt::Display for MemoryDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.column_width();
        let label = Self::LABEL_WIDTH;

        writeln!(f)?;
        write!(f, "{:<label$}", Self::INDEX_LABEL)?;
        for index in 0..self.tape.len() {
            write!(f, "{index:>width$} ")?;
        }
        writeln!(f)?;

        write!(f, "{:<label$}", Self::VALUE_LABEL)?;
        for value in self.tape.cells() {
            write!(f, "{value:>width$} ")?;
        }
        writeln!(f)
    }
}
