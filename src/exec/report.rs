//! Run outcome reporting

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::plan::NodeId;
use crate::store::OutputHandle;

/// One node that failed outright during the run
#[derive(Debug, Clone, Serialize)]
pub struct NodeFailure {
    pub node: NodeId,
    pub error: String,
}

/// Full accounting of a run; nothing is silently dropped
///
/// Every internal node of the planned tree lands in exactly one of
/// `executed`, `reused`, `failed`, or `unreachable`. The run succeeded iff the
/// root produced (or already had) a valid output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub n_leaves: usize,
    pub merge_factor: usize,
    pub total_nodes: usize,
    pub root: NodeId,
    /// Nodes merged by this run, in completion order
    pub executed: Vec<NodeId>,
    /// Nodes adopted from a previous run's outputs without recomputation
    pub reused: Vec<NodeId>,
    /// Nodes whose own merge failed or whose leaves were missing
    pub failed: Vec<NodeFailure>,
    /// Ancestors of failures that could never be scheduled
    pub unreachable: Vec<NodeId>,
    /// Root output handle for the external sink, when the root completed
    pub root_output: Option<OutputHandle>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Whether the root completed
    pub fn is_success(&self) -> bool {
        self.root_output.is_some()
    }

    /// Nodes complete at the end of the run, executed or reused
    pub fn completed_count(&self) -> usize {
        self.executed.len() + self.reused.len()
    }
}
