//! Tests for changed-node detection
//!
//! These tests verify:
//! - Without a previous crawl every node is changed
//! - Only address and version differences count as a change
//! - The result never names a node outside the new crawl

use std::collections::BTreeMap;
use crawlstore::delta::{compute_changed_nodes, CrawlDelta};
use crawlstore::model::{CrawlMeta, NodeSnapshot, ProcessedCrawl};

// =============================================================================
// Helper Functions
// =============================================================================

fn node(ipp: &str, version: &str, uptime: u64) -> NodeSnapshot {
    NodeSnapshot {
        ipp: Some(ipp.to_string()),
        version: Some(version.to_string()),
        uptime: Some(uptime),
        ..NodeSnapshot::default()
    }
}

fn nodes(entries: &[(&str, NodeSnapshot)]) -> BTreeMap<String, NodeSnapshot> {
    entries
        .iter()
        .map(|(k, n)| (k.to_string(), n.clone()))
        .collect()
}

// =============================================================================
// Change Detection Tests
// =============================================================================

#[test]
fn test_everything_changed_without_previous_crawl() {
    let new = nodes(&[("A", node("1.1.1.1:1", "1", 5)), ("B", node("2.2.2.2:1", "1", 5))]);
    let changed = compute_changed_nodes(&new, None);
    assert_eq!(changed.len(), 2);
}

#[test]
fn test_only_address_or_version_matter() {
    let old = nodes(&[
        ("SAME", node("1.1.1.1:1", "1", 5)),
        ("MOVED", node("2.2.2.2:1", "1", 5)),
        ("UPGRADED", node("3.3.3.3:1", "1", 5)),
    ]);
    let new = nodes(&[
        ("SAME", node("1.1.1.1:1", "1", 999)),
        ("MOVED", node("9.9.9.9:1", "1", 5)),
        ("UPGRADED", node("3.3.3.3:1", "2", 5)),
        ("FRESH", node("4.4.4.4:1", "1", 5)),
    ]);
    let changed = compute_changed_nodes(&new, Some(&old));
    let keys: Vec<_> = changed.keys().copied().collect();
    assert_eq!(keys, ["FRESH", "MOVED", "UPGRADED"]);
}

#[test]
fn test_result_is_subset_of_new_nodes() {
    let old = nodes(&[("GONE", node("1.1.1.1:1", "1", 5))]);
    let new = nodes(&[("A", node("1.1.1.1:1", "1", 5))]);
    let changed = compute_changed_nodes(&new, Some(&old));
    assert!(changed.keys().all(|k| new.contains_key(*k)));
    assert!(!changed.contains_key("GONE"));
}

#[test]
fn test_crawl_delta_bundles_both_results() {
    let crawl = |id: &str, nodes: BTreeMap<String, NodeSnapshot>| ProcessedCrawl {
        crawl: CrawlMeta {
            id: id.to_string(),
            start: None,
            end: None,
            entry: None,
        },
        nodes,
        connections: BTreeMap::new(),
    };
    let old = crawl("c1", nodes(&[("A", node("1.1.1.1:1", "1", 5))]));
    let new = crawl(
        "c2",
        nodes(&[("A", node("1.1.1.1:1", "1", 6)), ("B", node("2.2.2.2:1", "1", 5))]),
    );

    let delta = CrawlDelta::compute(&new, Some(&old)).unwrap();
    assert_eq!(delta.changed_nodes.keys().copied().collect::<Vec<_>>(), ["B"]);
    assert_eq!(delta.node_stats.len(), 2);
}
