//! Completion tracking
//!
//! The only process-wide shared state of a run. Tracks which nodes have a
//! valid output, hands out exclusive claims so a ready node is executed by
//! exactly one worker, and on resume decides whether a prior run's output can
//! be adopted instead of recomputed.

mod memory;
mod store;

pub use memory::InMemoryTracker;
pub use store::StoreTracker;

use async_trait::async_trait;

use crate::error::MergeResult;
use crate::plan::NodeId;
use crate::store::OutputHandle;

/// Completion and claim state for merge nodes
#[async_trait]
pub trait CompletionTracker: Send + Sync {
    /// Handle of the node's valid output, if it is complete
    async fn is_complete(&self, id: &NodeId) -> MergeResult<Option<OutputHandle>>;

    /// Atomically claim the node for execution
    ///
    /// Returns true exactly once per node per run; a false return means
    /// another worker owns it or it is already complete.
    async fn claim(&self, id: &NodeId) -> MergeResult<bool>;

    /// Record the node's freshly persisted output
    async fn mark_complete(&self, id: &NodeId, handle: OutputHandle) -> MergeResult<()>;
}
