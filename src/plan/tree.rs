//! Merge tree planning
//!
//! Pure computation of the tree shape for a given leaf count and merge
//! factor. No I/O happens here; the same inputs always produce the same tree,
//! which is what lets a resumed run find the outputs a previous run left
//! behind.

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::error::{MergeError, MergeResult};

/// Half-open range of leaf indices `[start, end)` owned by a depth-1 node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafRange {
    pub start: usize,
    pub end: usize,
}

impl LeafRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "leaf range must be non-empty");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Leaf indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        self.start..self.end
    }
}

/// Ordered inputs of one merge node
///
/// Depth-1 nodes consume a contiguous run of leaves; every deeper node
/// consumes the outputs of the nodes one level below it. The left-to-right
/// order recorded here is the order inputs are handed to the merge capability,
/// which matters for order-sensitive merges such as concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Children {
    Leaves(LeafRange),
    Nodes(Vec<NodeId>),
}

impl Children {
    pub fn len(&self) -> usize {
        match self {
            Children::Leaves(range) => range.len(),
            Children::Nodes(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One internal node of the merge tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeNode {
    pub id: NodeId,
    pub children: Children,
}

/// The full planned tree for one (leaf count, merge factor) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeTree {
    n_leaves: usize,
    merge_factor: usize,
    /// All internal nodes in bottom-up, left-to-right order
    nodes: Vec<MergeNode>,
    root: NodeId,
}

impl MergeTree {
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn merge_factor(&self) -> usize {
        self.merge_factor
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of internal nodes (merge steps) in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the root, equal to the number of grouping rounds applied
    pub fn depth(&self) -> u32 {
        self.root.depth
    }

    /// All internal nodes in bottom-up, left-to-right order
    pub fn nodes(&self) -> impl Iterator<Item = &MergeNode> {
        self.nodes.iter()
    }

    pub fn node(&self, id: &NodeId) -> Option<&MergeNode> {
        // Nodes are stored level by level; a linear scan is fine for the tree
        // sizes this crate plans, but the ordering lets us stop early.
        self.nodes.iter().find(|n| n.id == *id)
    }
}

/// Plan the merge tree for `n_leaves` inputs grouped `merge_factor` at a time
///
/// Leaves are chunked left to right into runs of at most `merge_factor`; each
/// run becomes a depth-1 node. The resulting level is chunked the same way,
/// one level per round, until a single node remains. The last chunk of a level
/// may be shorter than the factor but is never empty, so chunking never
/// redistributes work to balance sizes. A single leaf still produces one
/// depth-1 node so the merge capability runs once and the output location is
/// canonical.
pub fn plan(n_leaves: usize, merge_factor: usize) -> MergeResult<MergeTree> {
    if n_leaves < 1 {
        return Err(MergeError::invalid_parameter(
            "n_leaves",
            n_leaves,
            "must be at least 1",
        ));
    }
    if merge_factor < 2 {
        return Err(MergeError::invalid_parameter(
            "merge_factor",
            merge_factor,
            "must be at least 2",
        ));
    }

    let mut nodes = Vec::new();

    // Round 1: group leaves into depth-1 nodes.
    let mut level: Vec<NodeId> = Vec::new();
    let mut start = 0;
    while start < n_leaves {
        let end = (start + merge_factor).min(n_leaves);
        let id = NodeId::new(1, level.len());
        nodes.push(MergeNode {
            id,
            children: Children::Leaves(LeafRange::new(start, end)),
        });
        level.push(id);
        start = end;
    }

    // Later rounds: group the previous level's nodes until one remains.
    let mut depth = 1;
    while level.len() > 1 {
        depth += 1;
        let mut next = Vec::new();
        for chunk in level.chunks(merge_factor) {
            let id = NodeId::new(depth, next.len());
            nodes.push(MergeNode {
                id,
                children: Children::Nodes(chunk.to_vec()),
            });
            next.push(id);
        }
        level = next;
    }

    let root = level[0];
    Ok(MergeTree {
        n_leaves,
        merge_factor,
        nodes,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_ranges(tree: &MergeTree) -> Vec<LeafRange> {
        tree.nodes()
            .filter_map(|n| match &n.children {
                Children::Leaves(range) => Some(*range),
                Children::Nodes(_) => None,
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            plan(0, 2),
            Err(MergeError::InvalidParameter { param: "n_leaves", .. })
        ));
        assert!(matches!(
            plan(5, 1),
            Err(MergeError::InvalidParameter { param: "merge_factor", .. })
        ));
        assert!(matches!(
            plan(5, 0),
            Err(MergeError::InvalidParameter { param: "merge_factor", .. })
        ));
    }

    #[test]
    fn single_leaf_wraps_into_a_root_that_still_merges() {
        let tree = plan(1, 2).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root(), NodeId::new(1, 0));
        assert_eq!(tree.depth(), 1);
        let root = tree.node(&tree.root()).unwrap();
        assert_eq!(root.children, Children::Leaves(LeafRange::new(0, 1)));
    }

    #[test]
    fn leaf_ranges_cover_all_leaves_exactly_once() {
        for n in 1..=48 {
            for f in 2..=6 {
                let tree = plan(n, f).unwrap();
                let ranges = leaf_ranges(&tree);
                let mut covered = 0;
                for (i, range) in ranges.iter().enumerate() {
                    assert!(!range.is_empty(), "empty range at n={n} f={f}");
                    assert_eq!(range.start, covered, "gap/overlap at n={n} f={f} chunk {i}");
                    covered = range.end;
                }
                assert_eq!(covered, n, "ranges do not cover [0, {n})");
            }
        }
    }

    #[test]
    fn every_node_has_between_one_and_factor_children() {
        for n in 1..=48 {
            for f in 2..=6 {
                let tree = plan(n, f).unwrap();
                for node in tree.nodes() {
                    let count = node.children.len();
                    assert!(
                        (1..=f).contains(&count),
                        "node {} has {count} children at n={n} f={f}",
                        node.id
                    );
                }
            }
        }
    }

    #[test]
    fn exactly_one_root_at_final_depth() {
        for n in 1..=48 {
            for f in 2..=6 {
                let tree = plan(n, f).unwrap();
                let top: Vec<_> = tree
                    .nodes()
                    .filter(|node| node.id.depth == tree.depth())
                    .collect();
                assert_eq!(top.len(), 1);
                assert_eq!(top[0].id, tree.root());
                assert_eq!(tree.root().position, 0);
            }
        }
    }

    #[test]
    fn planning_is_deterministic() {
        for (n, f) in [(1, 2), (26, 2), (26, 5), (100, 3)] {
            assert_eq!(plan(n, f).unwrap(), plan(n, f).unwrap());
        }
    }

    #[test]
    fn alphabet_factor_two_shape() {
        // 26 -> 13 -> 7 -> 4 -> 2 -> 1
        let tree = plan(26, 2).unwrap();
        assert_eq!(tree.depth(), 5);
        assert_eq!(tree.node_count(), 13 + 7 + 4 + 2 + 1);
    }

    #[test]
    fn alphabet_factor_five_shape() {
        // Depth-1 groups of five: [0,5) [5,10) [10,15) [15,20) [20,25) [25,26)
        let tree = plan(26, 5).unwrap();
        assert_eq!(tree.depth(), 3);
        let ranges = leaf_ranges(&tree);
        assert_eq!(ranges.len(), 6);
        assert_eq!(ranges[5], LeafRange::new(25, 26));
    }

    #[test]
    fn children_preserve_left_to_right_order() {
        let tree = plan(10, 3).unwrap();
        for node in tree.nodes() {
            if let Children::Nodes(ids) = &node.children {
                for pair in ids.windows(2) {
                    assert!(pair[0].position < pair[1].position);
                    assert_eq!(pair[0].depth, pair[1].depth);
                }
            }
        }
    }
}
