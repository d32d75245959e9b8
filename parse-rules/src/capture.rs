//! The capture tree built while consuming input.
//!
//! Nodes live in a per-parse [`CaptureArena`] and refer to each other through
//! [`NodeId`]s, so a node found once can be shared by several enclosing
//! alternatives without copying.

use std::ops::Index;

use crate::grammar::RuleId;

/// Handle of a node inside a [`CaptureArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single captured item.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    Null,
    Text(String),
    Node(NodeId),
}

/// Everything an alternative captured so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Matches {
    /// Nothing captured.
    #[default]
    Empty,
    /// Only an epsilon placeholder.
    Null,
    Text(String),
    Node(NodeId),
    Seq(Vec<Capture>),
}

impl Matches {
    /// Add one capture.
    ///
    /// The first capture is stored bare, a second one promotes the matches to
    /// a sequence and later ones are appended to it.
    pub fn append(self, capture: Capture) -> Matches {
        let first = match self {
            Matches::Empty => return capture.into(),
            Matches::Seq(mut items) => {
                items.push(capture);
                return Matches::Seq(items);
            }
            Matches::Null => Capture::Null,
            Matches::Text(text) => Capture::Text(text),
            Matches::Node(node) => Capture::Node(node),
        };
        Matches::Seq(vec![first, capture])
    }

    /// Leave an epsilon placeholder if nothing was captured yet.
    pub fn or_null(self) -> Matches {
        match self {
            Matches::Empty => Matches::Null,
            other => other,
        }
    }
}

impl From<Capture> for Matches {
    fn from(capture: Capture) -> Self {
        match capture {
            Capture::Null => Matches::Null,
            Capture::Text(text) => Matches::Text(text),
            Capture::Node(node) => Matches::Node(node),
        }
    }
}

/// The record of one accepted alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureNode {
    pub rule: RuleId,
    /// Index of the alternative within its rule.
    pub alternative: usize,
    /// Offset just past the consumed input.
    pub offset: usize,
    pub matches: Matches,
}

#[derive(Debug, Default)]
pub struct CaptureArena {
    nodes: Vec<CaptureNode>,
}

impl CaptureArena {
    pub fn alloc(&mut self, node: CaptureNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<NodeId> for CaptureArena {
    type Output = CaptureNode;

    fn index(&self, id: NodeId) -> &CaptureNode {
        &self.nodes[id.0]
    }
}
