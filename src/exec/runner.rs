//! Merge run driver
//!
//! Walks the scheduler's ready set with a semaphore-bounded pool of tokio
//! tasks. Each ready node is claimed, its inputs gathered in the planner's
//! left-to-right chunk order, merged by the user capability, persisted, and
//! marked complete. Failures stay local to their subtree: siblings keep
//! running and only the failed node's ancestor chain goes unscheduled.

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::report::{NodeFailure, RunReport};
use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::merge::MergeCapability;
use crate::plan::{plan, Children, NodeId};
use crate::schedule::{MergeScheduler, NodeState};
use crate::source::LeafSource;
use crate::store::{OutputHandle, OutputStore};
use crate::tracker::CompletionTracker;

/// Drives one hierarchical merge run end to end
pub struct MergeRunner<A> {
    config: MergeConfig,
    source: Arc<dyn LeafSource<A>>,
    capability: Arc<dyn MergeCapability<A>>,
    store: Arc<dyn OutputStore<A>>,
    tracker: Arc<dyn CompletionTracker>,
}

impl<A> MergeRunner<A>
where
    A: Send + Sync + 'static,
{
    pub fn new(
        config: MergeConfig,
        source: Arc<dyn LeafSource<A>>,
        capability: Arc<dyn MergeCapability<A>>,
        store: Arc<dyn OutputStore<A>>,
        tracker: Arc<dyn CompletionTracker>,
    ) -> Self {
        Self {
            config,
            source,
            capability,
            store,
            tracker,
        }
    }

    /// Run the merge to completion or until every remaining node is blocked
    ///
    /// Fatal configuration errors abort before any work starts; per-node
    /// failures end up in the report instead.
    pub async fn run(&self) -> MergeResult<RunReport> {
        self.config.validate()?;
        let started_at = Utc::now();

        let n_leaves = self
            .source
            .leaf_count()
            .await
            .map_err(|e| MergeError::Storage {
                message: "Failed to count leaves".to_string(),
                path: None,
                source: Some(e.into()),
            })?;
        let tree = plan(n_leaves, self.config.merge_factor)?;
        info!(
            "Planned merge tree: {} leaves, factor {}, {} nodes, depth {}",
            n_leaves,
            self.config.merge_factor,
            tree.node_count(),
            tree.depth()
        );

        let mut scheduler = MergeScheduler::new(&tree);
        let mut reused = Vec::new();

        // Adopt prior outputs bottom-up so parents of adopted nodes unlock.
        if self.config.resume {
            for node in tree.nodes() {
                if self.tracker.is_complete(&node.id).await?.is_some() {
                    scheduler.complete(node.id);
                    reused.push(node.id);
                }
            }
            if !reused.is_empty() {
                info!("Resuming: {} of {} nodes already complete", reused.len(), tree.node_count());
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));
        let mut in_flight = FuturesUnordered::new();
        let mut executed = Vec::new();
        let mut failed: Vec<NodeFailure> = Vec::new();

        loop {
            for id in scheduler.take_ready() {
                if !self.tracker.claim(&id).await? {
                    debug!("Node {} already claimed elsewhere, skipping", id);
                    continue;
                }
                let children = scheduler
                    .dependencies(&id)
                    .cloned()
                    .ok_or_else(|| MergeError::storage(format!("Unknown node {id}")))?;

                let permit = semaphore.clone().acquire_owned().await.unwrap();
                let source = self.source.clone();
                let capability = self.capability.clone();
                let store = self.store.clone();
                let tracker = self.tracker.clone();

                // The id stays outside the spawned task so even a panicking
                // merge is attributed to its node.
                let task = tokio::spawn(async move {
                    let result =
                        execute_node(id, children, source, capability, store, tracker).await;
                    drop(permit);
                    result
                });
                in_flight.push(async move { (id, task.await) });
            }

            match in_flight.next().await {
                None => break,
                Some((id, Ok(Ok(_handle)))) => {
                    debug!("Node {} complete", id);
                    scheduler.complete(id);
                    executed.push(id);
                }
                Some((id, Ok(Err(e)))) => {
                    warn!("Node {} failed: {}", id, e);
                    scheduler.fail(id);
                    failed.push(NodeFailure {
                        node: id,
                        error: e.to_string(),
                    });
                }
                Some((id, Err(e))) => {
                    warn!("Merge task for node {} panicked: {}", id, e);
                    scheduler.fail(id);
                    failed.push(NodeFailure {
                        node: id,
                        error: format!("merge task panicked: {e}"),
                    });
                }
            }
        }

        // Only expose a root handle the current run actually produced or
        // adopted; a stale output left in the store by an earlier run is not
        // a success when this run's root chain is blocked.
        let root_output = if scheduler.state_of(&tree.root()) == Some(NodeState::Complete) {
            self.tracker.is_complete(&tree.root()).await?
        } else {
            None
        };
        let unreachable = scheduler.unfinished();
        failed.sort_by_key(|f| f.node);
        reused.sort();

        let report = RunReport {
            n_leaves,
            merge_factor: self.config.merge_factor,
            total_nodes: tree.node_count(),
            root: tree.root(),
            executed,
            reused,
            failed,
            unreachable,
            root_output,
            started_at,
            finished_at: Utc::now(),
        };

        if report.is_success() {
            info!(
                "Merge complete: {} executed, {} reused",
                report.executed.len(),
                report.reused.len()
            );
        } else {
            warn!(
                "Merge did not reach the root: {} failed, {} unreachable",
                report.failed.len(),
                report.unreachable.len()
            );
        }
        Ok(report)
    }
}

/// Execute one node: gather inputs, merge, persist, mark complete
async fn execute_node<A>(
    id: NodeId,
    children: Children,
    source: Arc<dyn LeafSource<A>>,
    capability: Arc<dyn MergeCapability<A>>,
    store: Arc<dyn OutputStore<A>>,
    tracker: Arc<dyn CompletionTracker>,
) -> MergeResult<OutputHandle>
where
    A: Send + Sync + 'static,
{
    let inputs = match children {
        Children::Leaves(range) => {
            let mut missing = Vec::new();
            for index in range.indices() {
                let exists = source
                    .leaf_exists(index)
                    .await
                    .map_err(|e| MergeError::LeafLoad {
                        node: id,
                        index,
                        source: e.into(),
                    })?;
                if !exists {
                    missing.push(index);
                }
            }
            if !missing.is_empty() {
                return Err(MergeError::MissingLeaf {
                    node: id,
                    leaves: missing,
                });
            }

            let mut inputs = Vec::with_capacity(range.len());
            for index in range.indices() {
                let leaf = source
                    .load_leaf(index)
                    .await
                    .map_err(|e| MergeError::LeafLoad {
                        node: id,
                        index,
                        source: e.into(),
                    })?;
                inputs.push(leaf);
            }
            inputs
        }
        Children::Nodes(ids) => {
            let mut inputs = Vec::with_capacity(ids.len());
            for child in ids {
                let handle = tracker
                    .is_complete(&child)
                    .await?
                    .ok_or(MergeError::ChildOutputMissing { node: id, child })?;
                inputs.push(store.load(&handle).await?);
            }
            inputs
        }
    };

    let artifact = capability
        .merge(inputs)
        .await
        .map_err(|e| MergeError::merge_failed(id, e))?;
    let handle = store.persist(&id, &artifact).await?;
    tracker.mark_complete(&id, handle.clone()).await?;
    Ok(handle)
}
