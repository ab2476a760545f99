//! Stable node addressing
//!
//! Every internal node of a merge tree is identified by its (depth, position)
//! coordinates. The rendered form `d{depth}-p{position}` is the durable
//! address: completion state and persisted outputs are keyed by it, so it must
//! be identical across runs for the same tree shape and never depend on
//! execution order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one internal merge node
///
/// Depth 1 nodes sit directly above the leaves; the root is the single node at
/// the tree's final depth. Position counts left to right within a depth level,
/// starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub depth: u32,
    pub position: usize,
}

impl NodeId {
    pub fn new(depth: u32, position: usize) -> Self {
        Self { depth, position }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}-p{}", self.depth, self.position)
    }
}

/// Error parsing a rendered node address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeIdError(String);

impl fmt::Display for ParseNodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid node address: {}", self.0)
    }
}

impl std::error::Error for ParseNodeIdError {}

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('d')
            .ok_or_else(|| ParseNodeIdError(s.to_string()))?;
        let (depth, pos) = rest
            .split_once("-p")
            .ok_or_else(|| ParseNodeIdError(s.to_string()))?;
        let depth = depth
            .parse::<u32>()
            .map_err(|_| ParseNodeIdError(s.to_string()))?;
        let position = pos
            .parse::<usize>()
            .map_err(|_| ParseNodeIdError(s.to_string()))?;
        Ok(NodeId { depth, position })
    }
}
