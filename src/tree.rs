//! Arena-backed syntax tree.
//!
//! All nodes live in one `Vec` and refer to each other by [`NodeId`]. The
//! root is always a synthetic `Start` node at id 0; each `Loop` node owns its
//! body as its children. There is no node for `]`: the end of a loop's
//! children list is where the loop closes.

use std::fmt;

use crate::lexer::Token;

/// Index of a node in its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Start,
    MoveRight,
    MoveLeft,
    Increment,
    Decrement,
    Output,
    Input,
    Loop,
}

impl NodeKind {
    /// Node kind for a token; `None` for `]`, which never becomes a node.
    pub fn from_token(token: Token) -> Option<NodeKind> {
        match token {
            Token::MoveRight => Some(NodeKind::MoveRight),
            Token::MoveLeft => Some(NodeKind::MoveLeft),
            Token::Increment => Some(NodeKind::Increment),
            Token::Decrement => Some(NodeKind::Decrement),
            Token::Output => Some(NodeKind::Output),
            Token::Input => Some(NodeKind::Input),
            Token::LoopOpen => Some(NodeKind::Loop),
            Token::LoopClose => None,
        }
    }

    /// Source symbol, or `None` for the synthetic root.
    pub fn symbol(self) -> Option<char> {
        match self {
            NodeKind::Start => None,
            NodeKind::MoveRight => Some('>'),
            NodeKind::MoveLeft => Some('<'),
            NodeKind::Increment => Some('+'),
            NodeKind::Decrement => Some('-'),
            NodeKind::Output => Some('.'),
            NodeKind::Input => Some(','),
            NodeKind::Loop => Some('['),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    // index of this node in its parent's children
    position: usize,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// A tree holding only the `Start` node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Start,
                parent: None,
                children: Vec::new(),
                position: 0,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Total node count, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id.0];
        let parent = node.parent?;
        self.nodes[parent.0].children.get(node.position + 1).copied()
    }

    /// Append a new node as the last child of `parent` and return its id.
    pub(crate) fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let position = self.nodes[parent.0].children.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            position,
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

/// Indented listing: one node per line, two spaces per depth level.
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Explicit stack; deep nesting must not recurse.
        let mut pending = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = pending.pop() {
            let indent = depth * 2;
            match self.kind(id).symbol() {
                None => writeln!(f, "{:indent$}Program Start", "")?,
                Some(symbol) => writeln!(f, "{:indent$}Command({symbol})", "")?,
            }
            for &child in self.children(id).iter().rev() {
                pending.push((child, depth + 1));
            }
        }
        Ok(())
    }
}
