//! In-memory output store for tests and single-process runs

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{OutputHandle, OutputStore};
use crate::error::{MergeError, MergeResult};
use crate::plan::NodeId;

/// Keeps node outputs in a map; nothing survives the process
pub struct MemoryStore<A> {
    outputs: RwLock<HashMap<NodeId, A>>,
}

impl<A> MemoryStore<A> {
    pub fn new() -> Self {
        Self {
            outputs: RwLock::new(HashMap::new()),
        }
    }
}

impl<A> Default for MemoryStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<A> OutputStore<A> for MemoryStore<A>
where
    A: Clone + Send + Sync,
{
    async fn persist(&self, id: &NodeId, artifact: &A) -> MergeResult<OutputHandle> {
        self.outputs.write().await.insert(*id, artifact.clone());
        Ok(OutputHandle {
            node: *id,
            location: id.to_string(),
        })
    }

    async fn load(&self, handle: &OutputHandle) -> MergeResult<A> {
        self.outputs
            .read()
            .await
            .get(&handle.node)
            .cloned()
            .ok_or_else(|| MergeError::storage(format!("No output stored for {}", handle.node)))
    }

    async fn find(&self, id: &NodeId) -> MergeResult<Option<OutputHandle>> {
        Ok(self.outputs.read().await.get(id).map(|_| OutputHandle {
            node: *id,
            location: id.to_string(),
        }))
    }
}
