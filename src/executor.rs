//! Iterative tree-walking execution.
//!
//! The executor carries one piece of control state, the node to execute
//! next. Executing a node applies its effect to the tape and yields the next
//! node:
//!
//! - a command node yields its successor;
//! - a loop node on a non-zero cell yields its first child, on a zero cell its
//!   successor;
//! - the successor of a node is its next sibling, or, at the end of a loop
//!   body, the owning loop node, which then re-checks its condition.
//!
//! Nothing recurses, so native stack use does not grow with program size or
//! loop trip counts.

use std::io::{self, Write};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::io::CharIo;
use crate::tape::Tape;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

/// Errors that can stop a run.
///
/// A parsed program has no failing instruction; every variant comes from
/// the I/O capability or from an execution control.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The I/O capability failed.
    #[error("I/O error at step {step}: {source}")]
    Io {
        step: usize,
        #[source]
        source: io::Error,
    },

    /// The user interrupted an input read.
    #[error("Execution interrupted")]
    Interrupted,

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Cancelled,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Debug)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

pub struct Executor<'t, I> {
    tree: &'t SyntaxTree,
    tape: Tape,
    io: I,
    // None once the run has finished or failed
    current: Option<NodeId>,
    steps: usize,
    control: Option<StepControl>,
    trace: Option<Box<dyn Write + Send>>,
}

impl<'t, I: CharIo> Executor<'t, I> {
    pub fn new(tree: &'t SyntaxTree, tape: Tape, io: I) -> Self {
        Self {
            tree,
            tape,
            io,
            current: Some(tree.root()),
            steps: 0,
            control: None,
            trace: None,
        }
    }

    /// Check `control` before every step.
    pub fn with_control(mut self, control: StepControl) -> Self {
        self.control = Some(control);
        self
    }

    /// Write a step-by-step table of operations to `sink`.
    pub fn with_trace<W: Write + Send + 'static>(mut self, sink: W) -> Self {
        self.trace = Some(Box::new(sink));
        self
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Nodes executed so far, including loop re-checks and the root.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn into_parts(self) -> (Tape, I) {
        (self.tape, self.io)
    }

    /// Execute the program to completion.
    ///
    /// A run happens once: after `run` returns, whether with `Ok` or `Err`,
    /// further calls do nothing.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        if self.current.is_some() {
            self.write_trace_header()?;
        }
        while let Some(id) = self.current.take() {
            self.check_control()?;
            self.current = self.execute(id)?;
            self.steps += 1;
        }
        tracing::debug!(steps = self.steps, pointer = self.tape.pointer(), "execution finished");
        Ok(())
    }

    fn check_control(&self) -> Result<(), RuntimeError> {
        let Some(ctrl) = self.control.as_ref() else {
            return Ok(());
        };
        if ctrl.cancel_flag.load(Ordering::Relaxed) {
            return Err(RuntimeError::Cancelled);
        }
        if let Some(limit) = ctrl.max_steps {
            if self.steps >= limit {
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }
        Ok(())
    }

    /// Apply one node's effect and return the node to execute next.
    fn execute(&mut self, id: NodeId) -> Result<Option<NodeId>, RuntimeError> {
        let kind = self.tree.kind(id);
        let (ptr_before, cell_before) = (self.tape.pointer(), self.tape.current());

        let next = match kind {
            NodeKind::Start => self.tree.first_child(id),
            NodeKind::MoveRight => {
                self.tape.move_right();
                self.successor(id)
            }
            NodeKind::MoveLeft => {
                self.tape.move_left();
                self.successor(id)
            }
            NodeKind::Increment => {
                self.tape.increment();
                self.successor(id)
            }
            NodeKind::Decrement => {
                self.tape.decrement();
                self.successor(id)
            }
            NodeKind::Output => {
                let step = self.steps;
                self.io
                    .write_byte(self.tape.current())
                    .map_err(|source| io_error(step, source))?;
                self.successor(id)
            }
            NodeKind::Input => {
                let step = self.steps;
                let byte = self.io.read_char().map_err(|source| io_error(step, source))?;
                self.tape.set_current(byte);
                self.successor(id)
            }
            NodeKind::Loop => {
                if self.tape.current() != 0 {
                    // An empty body spins on the loop node itself.
                    Some(self.tree.first_child(id).unwrap_or(id))
                } else {
                    self.successor(id)
                }
            }
        };

        if self.trace.is_some() {
            let action = self.describe(kind, id, ptr_before, cell_before, next);
            self.write_trace_row(id, kind, ptr_before, cell_before, &action)?;
        }

        Ok(next)
    }

    /// Next sibling, else the enclosing loop (to re-check it), else the end.
    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(next) = self.tree.next_sibling(id) {
            return Some(next);
        }
        let parent = self.tree.parent(id)?;
        match self.tree.kind(parent) {
            NodeKind::Loop => Some(parent),
            _ => None,
        }
    }

    fn describe(
        &self,
        kind: NodeKind,
        id: NodeId,
        ptr_before: usize,
        cell_before: u8,
        next: Option<NodeId>,
    ) -> String {
        let ptr = self.tape.pointer();
        let cell = self.tape.current();
        match kind {
            NodeKind::Start => "Program start".to_string(),
            NodeKind::MoveRight | NodeKind::MoveLeft if ptr == ptr_before => {
                format!("Pointer stays at index {ptr} (tape edge)")
            }
            NodeKind::MoveRight | NodeKind::MoveLeft => format!("Moved pointer head to index {ptr}"),
            NodeKind::Increment => format!("Increment cell[{ptr}] from {cell_before} to {cell}"),
            NodeKind::Decrement => format!("Decrement cell[{ptr}] from {cell_before} to {cell}"),
            NodeKind::Output => format!("Output byte {cell}"),
            NodeKind::Input => format!("Read byte -> {cell}"),
            NodeKind::Loop if cell == 0 => "Cell is 0; skip past loop".to_string(),
            NodeKind::Loop if next == Some(id) => "Cell != 0; empty loop body".to_string(),
            NodeKind::Loop => "Cell != 0; enter loop body".to_string(),
        }
    }

    fn write_trace_header(&mut self) -> Result<(), RuntimeError> {
        let step = self.steps;
        if let Some(sink) = self.trace.as_mut() {
            writeln!(sink, "STEP | NODE | PTR | CELL | INSTR | ACTION")
                .and_then(|_| {
                    writeln!(
                        sink,
                        "-----+------+-----+------+-------+------------------------------------------------"
                    )
                })
                .map_err(|source| io_error(step, source))?;
        }
        Ok(())
    }

    fn write_trace_row(
        &mut self,
        id: NodeId,
        kind: NodeKind,
        ptr_before: usize,
        cell_before: u8,
        action: &str,
    ) -> Result<(), RuntimeError> {
        let step = self.steps;
        let instr = kind.symbol().unwrap_or('^');
        if let Some(sink) = self.trace.as_mut() {
            writeln!(
                sink,
                "{:<4} | {:<4} | {:<3} | {:<4} |   {}   | {}",
                step,
                id.index(),
                ptr_before,
                cell_before,
                instr,
                action
            )
            .map_err(|source| io_error(step, source))?;
        }
        Ok(())
    }
}

fn io_error(step: usize, source: io::Error) -> RuntimeError {
    if source.kind() == io::ErrorKind::Interrupted {
        RuntimeError::Interrupted
    } else {
        RuntimeError::Io { step, source }
    }
}
