//! Leaf source capability
//!
//! Leaves are produced by an external collaborator; the scheduler only needs
//! to count them, check that one exists, and load it. Indices are the sole
//! identity of a leaf.

use anyhow::Result;
use async_trait::async_trait;

/// Provider of the independently produced input artifacts
#[async_trait]
pub trait LeafSource<A>: Send + Sync {
    /// Total number of leaves; indices run over `[0, leaf_count())`
    async fn leaf_count(&self) -> Result<usize>;

    /// Whether the leaf at `index` exists and is loadable
    async fn leaf_exists(&self, index: usize) -> Result<bool>;

    /// Load the leaf at `index`
    async fn load_leaf(&self, index: usize) -> Result<A>;
}
