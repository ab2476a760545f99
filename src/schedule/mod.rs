//! Dependency scheduling over a planned merge tree
//!
//! Turns a [`MergeTree`](crate::plan::MergeTree) into a dependency graph and
//! tracks per-node lifecycle state as the run progresses. The scheduler never
//! runs a merge itself; it yields ready nodes to the driver and absorbs
//! completion and failure notifications. Any topological order is acceptable,
//! and siblings at the same depth may complete in any interleaving.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::plan::{Children, MergeTree, NodeId};

/// Lifecycle of one node within a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Waiting on child outputs
    Pending,
    /// All dependencies satisfied, not yet handed to a worker
    Ready,
    /// Claimed by a worker
    Running,
    /// Output exists and is valid (freshly computed or adopted on resume)
    Complete,
    /// This node's own merge failed or its leaves were missing
    Failed,
    /// An ancestor chain above a failure; will never be scheduled this run
    Unreachable,
}

/// Ready-set scheduler over the internal nodes of a merge tree
///
/// Edges run child to parent, so a node's parents are its outgoing
/// neighbors. Depth-1 nodes depend only on leaves, which are checked at
/// execution time, so they start out ready.
pub struct MergeScheduler {
    graph: DiGraph<NodeId, ()>,
    index: HashMap<NodeId, NodeIndex>,
    children: HashMap<NodeId, Children>,
    state: HashMap<NodeId, NodeState>,
    /// Count of child-node outputs a node is still waiting for
    pending: HashMap<NodeId, usize>,
    ready: Vec<NodeId>,
    root: NodeId,
}

impl MergeScheduler {
    pub fn new(tree: &MergeTree) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        let mut children = HashMap::new();
        let mut state = HashMap::new();
        let mut pending = HashMap::new();
        let mut ready = Vec::new();

        for node in tree.nodes() {
            let idx = graph.add_node(node.id);
            index.insert(node.id, idx);
            children.insert(node.id, node.children.clone());
        }

        for node in tree.nodes() {
            match &node.children {
                Children::Leaves(_) => {
                    pending.insert(node.id, 0);
                    state.insert(node.id, NodeState::Ready);
                    ready.push(node.id);
                }
                Children::Nodes(kids) => {
                    pending.insert(node.id, kids.len());
                    state.insert(node.id, NodeState::Pending);
                    for kid in kids {
                        graph.add_edge(index[kid], index[&node.id], ());
                    }
                }
            }
        }

        Self {
            graph,
            index,
            children,
            state,
            pending,
            ready,
            root: tree.root(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Dependencies of a node: a leaf range or ordered child node ids
    pub fn dependencies(&self, id: &NodeId) -> Option<&Children> {
        self.children.get(id)
    }

    pub fn state_of(&self, id: &NodeId) -> Option<NodeState> {
        self.state.get(id).copied()
    }

    /// Drain the nodes whose dependencies are all satisfied, marking them
    /// running
    pub fn take_ready(&mut self) -> Vec<NodeId> {
        let ready: Vec<NodeId> = self
            .ready
            .drain(..)
            .filter(|id| self.state.get(id) == Some(&NodeState::Ready))
            .collect();
        for id in &ready {
            self.state.insert(*id, NodeState::Running);
        }
        ready
    }

    /// Record a node as complete and unlock any parent whose children are now
    /// all complete
    ///
    /// Also used during resume adoption, where a node may become complete
    /// before it was ever ready.
    pub fn complete(&mut self, id: NodeId) {
        self.state.insert(id, NodeState::Complete);
        let Some(&idx) = self.index.get(&id) else {
            return;
        };
        let parents: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|p| self.graph[p])
            .collect();
        for parent in parents {
            let remaining = self.pending.entry(parent).or_insert(0);
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 && self.state.get(&parent) == Some(&NodeState::Pending) {
                debug!("Node {} is ready", parent);
                self.state.insert(parent, NodeState::Ready);
                self.ready.push(parent);
            }
        }
    }

    /// Record a node as failed and mark its whole ancestor chain unreachable
    ///
    /// Ancestors already complete (adopted on resume) keep their output.
    pub fn fail(&mut self, id: NodeId) {
        self.state.insert(id, NodeState::Failed);
        let Some(&idx) = self.index.get(&id) else {
            return;
        };
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            for parent in self.graph.neighbors_directed(current, Direction::Outgoing) {
                let parent_id = self.graph[parent];
                match self.state.get(&parent_id) {
                    Some(NodeState::Complete) | Some(NodeState::Unreachable) => {}
                    _ => {
                        self.state.insert(parent_id, NodeState::Unreachable);
                        stack.push(parent);
                    }
                }
            }
        }
    }

    /// Nodes currently in the given state, sorted for stable reporting
    pub fn nodes_in_state(&self, wanted: NodeState) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .state
            .iter()
            .filter(|(_, s)| **s == wanted)
            .map(|(id, _)| *id)
            .collect();
        nodes.sort();
        nodes
    }

    /// Nodes that neither completed nor failed outright
    pub fn unfinished(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .state
            .iter()
            .filter(|(_, s)| {
                !matches!(s, NodeState::Complete | NodeState::Failed)
            })
            .map(|(id, _)| *id)
            .collect();
        nodes.sort();
        nodes
    }
}
