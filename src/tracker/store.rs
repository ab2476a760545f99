//! Store-backed completion tracker for resumable runs

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CompletionTracker;
use crate::error::{MergeError, MergeResult};
use crate::merge::MergeCapability;
use crate::plan::NodeId;
use crate::store::{OutputHandle, OutputStore};

#[derive(Default)]
struct TrackerState {
    complete: HashMap<NodeId, OutputHandle>,
    claimed: HashSet<NodeId>,
}

/// Tracker that adopts outputs a previous run left in the store
///
/// A node is complete if this run marked it complete, or if the store already
/// holds an output at the node's address that loads and passes the merge
/// capability's validity check. Outputs failing either check are discarded as
/// corrupt and the node is recomputed; corruption is logged, never escalated.
pub struct StoreTracker<A> {
    store: Arc<dyn OutputStore<A>>,
    capability: Arc<dyn MergeCapability<A>>,
    state: Mutex<TrackerState>,
}

impl<A> StoreTracker<A> {
    pub fn new(store: Arc<dyn OutputStore<A>>, capability: Arc<dyn MergeCapability<A>>) -> Self {
        Self {
            store,
            capability,
            state: Mutex::new(TrackerState::default()),
        }
    }
}

#[async_trait]
impl<A> CompletionTracker for StoreTracker<A>
where
    A: Send + Sync + 'static,
{
    async fn is_complete(&self, id: &NodeId) -> MergeResult<Option<OutputHandle>> {
        if let Some(handle) = self.state.lock().await.complete.get(id) {
            return Ok(Some(handle.clone()));
        }

        let Some(handle) = self.store.find(id).await? else {
            return Ok(None);
        };

        let artifact = match self.store.load(&handle).await {
            Ok(artifact) => artifact,
            Err(MergeError::CorruptOutput { node, path }) => {
                warn!(
                    "Discarding unreadable output for {} at {:?}; will recompute",
                    node, path
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !self.capability.validate(&artifact) {
            warn!("Existing output for {} failed validation; will recompute", id);
            return Ok(None);
        }

        debug!("Adopting prior output for {}", id);
        self.state
            .lock()
            .await
            .complete
            .insert(*id, handle.clone());
        Ok(Some(handle))
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
