//! Output persistence seam
//!
//! Where merged outputs live is pluggable. The store is keyed by node
//! address, so any run that plans the same tree can find what an earlier run
//! wrote. Outputs are never mutated in place, only overwritten whole by a
//! fresh computation.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MergeResult;
use crate::plan::NodeId;

/// Opaque reference to one node's durably stored output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputHandle {
    /// Node whose output this is
    pub node: NodeId,
    /// Backend-specific location (a file path, a map key, ...)
    pub location: String,
}

/// Durable storage for node outputs
#[async_trait]
pub trait OutputStore<A>: Send + Sync {
    /// Persist `artifact` as the output of `id`, replacing any prior output
    async fn persist(&self, id: &NodeId, artifact: &A) -> MergeResult<OutputHandle>;

    /// Load the artifact a handle points at
    async fn load(&self, handle: &OutputHandle) -> MergeResult<A>;

    /// Locate a pre-existing output for `id`, if one was ever persisted
    ///
    /// Existence only; whether the artifact is still acceptable is the
    /// completion tracker's call.
    async fn find(&self, id: &NodeId) -> MergeResult<Option<OutputHandle>>;
}
