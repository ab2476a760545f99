//! In-memory completion tracker

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use super::CompletionTracker;
use crate::error::MergeResult;
use crate::plan::NodeId;
use crate::store::OutputHandle;

#[derive(Default)]
struct TrackerState {
    complete: HashMap<NodeId, OutputHandle>,
    claimed: HashSet<NodeId>,
}

/// Tracker with no prior state; every node starts incomplete
///
/// Suits tests and runs that do not need to survive the process. Claim and
/// completion state live under one lock so check-then-mark is atomic.
#[derive(Default)]
pub struct InMemoryTracker {
    state: Mutex<TrackerState>,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionTracker for InMemoryTracker {
    async fn is_complete(&self, id: &NodeId) -> MergeResult<Option<OutputHandle>> {
        Ok(self.state.lock().await.complete.get(id).cloned())
    }

    async fn claim(&self, id: &NodeId) -> MergeResult<bool> {
        let mut state = self.state.lock().await;
        if state.complete.contains_key(id) {
            return Ok(false);
        }
        Ok(state.claimed.insert(*id))
    }

    async fn mark_complete(&self, id: &NodeId, handle: OutputHandle) -> MergeResult<()> {
        self.state.lock().await.complete.insert(*id, handle);
        Ok(())
    }
}
