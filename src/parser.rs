//! Builds the [`SyntaxTree`] from a [`TokenStream`].
//!
//! Bracket matching is a single pass: the cursor always points at the
//! innermost open loop (or the root), `[` descends into a new loop node and
//! `]` ascends one level. The stack of open loops makes both kinds of
//! unbalanced input direct to detect.

use std::fmt;

use crate::lexer::{Token, TokenStream};
use crate::tree::{NodeId, NodeKind, SyntaxTree};

/// Errors that can occur while parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// A `]` with no open loop to close.
    #[error("unmatched ']' at offset {offset}")]
    UnmatchedLoopClose { offset: usize },

    /// Input ended with a `[` still open; `offset` is the innermost one.
    #[error("unmatched '[' at offset {offset}")]
    UnmatchedLoopOpen { offset: usize },
}

impl SyntaxError {
    /// Character offset of the offending bracket in the source.
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnmatchedLoopClose { offset } | SyntaxError::UnmatchedLoopOpen { offset } => {
                *offset
            }
        }
    }

    pub fn bracket(&self) -> BracketKind {
        match self {
            SyntaxError::UnmatchedLoopClose { .. } => BracketKind::Close,
            SyntaxError::UnmatchedLoopOpen { .. } => BracketKind::Open,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Parse `tokens` into a syntax tree.
pub fn parse(tokens: &TokenStream) -> Result<SyntaxTree, SyntaxError> {
    let mut tree = SyntaxTree::new();
    let mut cursor: NodeId = tree.root();
    // (loop node, offset of its '[')
    let mut open_loops: Vec<(NodeId, usize)> = Vec::new();

    for (offset, token) in tokens.iter() {
        match token {
            Token::LoopOpen => {
                let node = tree.push_child(cursor, NodeKind::Loop);
                open_loops.push((node, offset));
                cursor = node;
            }
            Token::LoopClose => {
                let Some((node, _)) = open_loops.pop() else {
                    return Err(SyntaxError::UnmatchedLoopClose { offset });
                };
                cursor = tree.parent(node).unwrap_or(tree.root());
            }
            simple => {
                if let Some(kind) = NodeKind::from_token(simple) {
                    tree.push_child(cursor, kind);
                }
            }
        }
    }

    if let Some(&(_, offset)) = open_loops.last() {
        return Err(SyntaxError::UnmatchedLoopOpen { offset });
    }

    tracing::debug!(nodes = tree.len(), "parsed syntax tree");
    Ok(tree)
}
