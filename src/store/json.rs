//! File-backed JSON output store

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{OutputHandle, OutputStore};
use crate::error::{MergeError, MergeResult};
use crate::plan::NodeId;

/// Stores one pretty-printed JSON file per node under a root directory
///
/// File names are derived from the node address (`d2-p1.json`), so a resumed
/// run locates outputs without any index file. Writes go through a temp file
/// and a rename, never leaving a half-written output at the final path.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &NodeId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

#[async_trait]
impl<A> OutputStore<A> for JsonStore
where
    A: Serialize + DeserializeOwned + Send + Sync,
{
    async fn persist(&self, id: &NodeId, artifact: &A) -> MergeResult<OutputHandle> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| MergeError::storage_io("Failed to create store directory", self.root.clone(), e))?;

        let final_path = self.path_for(id);
        let temp_path = self.root.join(format!("{id}.json.tmp"));

        let json = serde_json::to_string_pretty(artifact).map_err(|e| MergeError::Storage {
            message: format!("Failed to serialize output for {id}"),
            path: Some(final_path.clone()),
            source: Some(Box::new(e)),
        })?;

        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| MergeError::storage_io("Failed to write output", temp_path.clone(), e))?;
        tokio::fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| MergeError::storage_io("Failed to finalize output", final_path.clone(), e))?;

        debug!("Persisted output for {} at {}", id, final_path.display());
        Ok(OutputHandle {
            node: *id,
            location: final_path.to_string_lossy().into_owned(),
        })
    }

    async fn load(&self, handle: &OutputHandle) -> MergeResult<A> {
        let path = PathBuf::from(&handle.location);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MergeError::storage_io("Failed to read output", path.clone(), e))?;
        serde_json::from_str(&contents).map_err(|_| MergeError::CorruptOutput {
            node: handle.node,
            path: Some(path),
        })
    }

    async fn find(&self, id: &NodeId) -> MergeResult<Option<OutputHandle>> {
        let path = self.path_for(id);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| MergeError::storage_io("Failed to probe output", path.clone(), e))?;
        Ok(exists.then(|| OutputHandle {
            node: *id,
            location: path.to_string_lossy().into_owned(),
        }))
    }
}
