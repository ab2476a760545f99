//! # Treefold
//!
//! A hierarchical merge scheduler: reduces a large collection of
//! independently produced input artifacts ("leaves") into a single merged
//! artifact by recursively combining small groups, instead of merging
//! everything in one step.
//!
//! The caller supplies three capabilities: a [`LeafSource`] that produces
//! the leaves, a [`MergeCapability`] that combines artifacts, and an
//! [`OutputStore`] that persists node outputs, plus a [`MergeConfig`]. The
//! [`MergeRunner`] plans a tree over the leaves, executes ready nodes in
//! parallel up to the configured limit, and reports exactly what completed,
//! what failed, and what was blocked. Runs are resumable: outputs a previous
//! run left in the store are validated and reused instead of recomputed.
//!
//! ## Modules
//!
//! - `plan` - Tree shape planning and stable node addressing
//! - `schedule` - Dependency graph and ready-set scheduling
//! - `exec` - Parallel run driver and run reporting
//! - `tracker` - Completion state, claims, and resume adoption
//! - `store` - Pluggable output persistence (JSON files, in-memory)
//! - `source` - Leaf source capability consumed from the outside
//! - `merge` - User merge capability and validity predicate
//! - `config` - Run configuration with TOML loading
//! - `error` - Structured error types

pub mod config;
pub mod error;
pub mod exec;
pub mod merge;
pub mod plan;
pub mod schedule;
pub mod source;
pub mod store;
pub mod tracker;

pub use config::MergeConfig;
pub use error::{MergeError, MergeResult};
pub use exec::{MergeRunner, NodeFailure, RunReport};
pub use merge::MergeCapability;
pub use plan::{plan, Children, LeafRange, MergeNode, MergeTree, NodeId};
pub use schedule::{MergeScheduler, NodeState};
pub use source::LeafSource;
pub use store::{JsonStore, MemoryStore, OutputHandle, OutputStore};
pub use tracker::{CompletionTracker, InMemoryTracker, StoreTracker};
