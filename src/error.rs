//! Structured error types for merge scheduling
//!
//! Provides error categorization with per-node context so failures can be
//! attributed to the exact tree node that produced them and reported without
//! losing sibling progress.

use std::path::PathBuf;
use thiserror::Error;

use crate::plan::NodeId;

/// Main error type for tree merge operations
#[derive(Debug, Error)]
pub enum MergeError {
    // Planning-time errors, fatal before any work starts
    #[error("Invalid parameter {param}: {reason} (got {value})")]
    InvalidParameter {
        param: &'static str,
        value: String,
        reason: &'static str,
    },

    // Per-node execution errors
    #[error("Node {node} requires leaves that are missing: {leaves:?}")]
    MissingLeaf { node: NodeId, leaves: Vec<usize> },

    #[error("Failed to load leaf {index} for node {node}")]
    LeafLoad {
        node: NodeId,
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Merge failed for node {node}: {reason}")]
    MergeFailed {
        node: NodeId,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Child output {child} not available for node {node}")]
    ChildOutputMissing { node: NodeId, child: NodeId },

    // Resume-time errors
    #[error("Existing output for node {node} failed validation")]
    CorruptOutput {
        node: NodeId,
        path: Option<PathBuf>,
    },

    // Persistence errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MergeError {
    /// Create an invalid-parameter error
    pub fn invalid_parameter(
        param: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            param,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a merge failure from the user capability's error
    pub fn merge_failed(node: NodeId, source: anyhow::Error) -> Self {
        Self::MergeFailed {
            node,
            reason: source.to_string(),
            source: Some(source.into()),
        }
    }

    /// Create a storage error without an underlying source
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a storage error wrapping an I/O failure at a path
    pub fn storage_io(message: impl Into<String>, path: PathBuf, source: std::io::Error) -> Self {
        Self::Storage {
            message: message.into(),
            path: Some(path),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error is fatal to the whole run rather than one subtree
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

/// Result type alias for merge operations
pub type MergeResult<T> = Result<T, MergeError>;
