//! Tree planning and node addressing
//!
//! Computes the shape of the merge tree for a given leaf count and merge
//! factor, and assigns every internal node a stable address.

mod address;
mod tree;

pub use address::{NodeId, ParseNodeIdError};
pub use tree::{plan, Children, LeafRange, MergeNode, MergeTree};
