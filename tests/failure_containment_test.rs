//! Partial-failure containment: a broken subtree never takes siblings down

mod common;

use common::{ConcatMerge, ExplodingMerge, LetterSource, PoisonedMerge};
use std::sync::Arc;
use treefold::{InMemoryTracker, MemoryStore, MergeConfig, MergeRunner, NodeId};

#[tokio::test]
async fn missing_leaf_blocks_only_its_ancestor_chain() {
    common::init_logging();
    // Index 10 is 'K'; with factor 2 it belongs to d1-p5 covering [10, 12).
    let source = LetterSource::alphabet_without(&[10]);
    let store = Arc::new(MemoryStore::new());
    let runner = MergeRunner::new(
        MergeConfig::default(),
        Arc::new(source),
        Arc::new(ConcatMerge::new()),
        store,
        Arc::new(InMemoryTracker::new()),
    );

    let report = runner.run().await.unwrap();
    assert!(!report.is_success());
    assert!(report.root_output.is_none());

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].node, NodeId::new(1, 5));
    assert!(report.failed[0].error.contains("10"));

    // The chain above d1-p5, root included, never runs; everything else does.
    assert_eq!(
        report.unreachable,
        vec![
            NodeId::new(2, 2),
            NodeId::new(3, 1),
            NodeId::new(4, 0),
            NodeId::new(5, 0),
        ]
    );
    assert_eq!(report.executed.len(), report.total_nodes - 1 - 4);
}

#[tokio::test]
async fn merge_failure_propagates_like_a_missing_leaf() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let runner = MergeRunner::new(
        MergeConfig::default(),
        Arc::new(LetterSource::alphabet()),
        Arc::new(PoisonedMerge::new("K")),
        store,
        Arc::new(InMemoryTracker::new()),
    );

    let report = runner.run().await.unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].node, NodeId::new(1, 5));
    assert_eq!(
        report.unreachable,
        vec![
            NodeId::new(2, 2),
            NodeId::new(3, 1),
            NodeId::new(4, 0),
            NodeId::new(5, 0),
        ]
    );
}

#[tokio::test]
async fn panicking_merge_is_attributed_to_its_node() {
    common::init_logging();
    let runner = MergeRunner::new(
        MergeConfig::default(),
        Arc::new(LetterSource::alphabet()),
        Arc::new(ExplodingMerge::new("K")),
        Arc::new(MemoryStore::new()),
        Arc::new(InMemoryTracker::new()),
    );

    let report = runner.run().await.unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].node, NodeId::new(1, 5));
    assert!(report.failed[0].error.contains("panicked"));
    // The panic propagates like any other node failure: only the ancestor
    // chain is blocked and siblings finish.
    assert_eq!(
        report.unreachable,
        vec![
            NodeId::new(2, 2),
            NodeId::new(3, 1),
            NodeId::new(4, 0),
            NodeId::new(5, 0),
        ]
    );
    assert_eq!(report.executed.len(), report.total_nodes - 1 - 4);
}

#[tokio::test]
async fn every_node_is_accounted_for_in_the_report() {
    common::init_logging();
    let source = LetterSource::alphabet_without(&[0, 25]);
    let runner = MergeRunner::new(
        MergeConfig::default(),
        Arc::new(source),
        Arc::new(ConcatMerge::new()),
        Arc::new(MemoryStore::new()),
        Arc::new(InMemoryTracker::new()),
    );

    let report = runner.run().await.unwrap();
    let accounted = report.executed.len()
        + report.reused.len()
        + report.failed.len()
        + report.unreachable.len();
    assert_eq!(accounted, report.total_nodes);
}
