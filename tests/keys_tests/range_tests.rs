//! Tests for key ranges
//!
//! These tests verify:
//! - Crawl, outbound and node history ranges are exact prefixes
//! - Prefix siblings (`c1` vs `c10`, `AB` vs `ABC`) stay outside a range
//! - The time range and full ranges cover every legal key

use chrono::{TimeZone, Utc};
use crawlstore::keys::{self, KeyRange};

// =============================================================================
// Prefix Ranges
// =============================================================================

#[test]
fn test_crawl_range_is_exact_prefix() {
    let range = KeyRange::crawl("c1").unwrap();
    assert_eq!(range.start, "c1!");
    assert_eq!(range.stop, "c1\"");

    for key in [
        keys::encode_stats_key("c1", "\"").unwrap(),
        keys::encode_stats_key("c1", "~~~").unwrap(),
        keys::encode_connection_key("c1", "a", "b").unwrap(),
    ] {
        assert!(range.contains(&key), "{} should be in range", key);
    }

    for key in [
        keys::encode_stats_key("c10", "a").unwrap(),
        keys::encode_stats_key("c2", "a").unwrap(),
        keys::encode_stats_key("c", "1").unwrap(),
        keys::encode_connection_key("c0", "a", "b").unwrap(),
    ] {
        assert!(!range.contains(&key), "{} should be out of range", key);
    }
}

#[test]
fn test_outbound_range_excludes_prefix_siblings() {
    let range = KeyRange::outbound("c1", "AB").unwrap();
    assert!(range.contains(&keys::encode_connection_key("c1", "AB", "Z").unwrap()));
    assert!(!range.contains(&keys::encode_connection_key("c1", "ABC", "Z").unwrap()));
    assert!(!range.contains(&keys::encode_connection_key("c1", "A", "B").unwrap()));
    assert!(!range.contains(&keys::encode_connection_key("c1", "Z", "AB").unwrap()));
}

#[test]
fn test_node_history_orders_by_crawl() {
    let range = KeyRange::node_history("P1").unwrap();
    let mut history = vec![
        keys::encode_node_key("c3", "P1").unwrap(),
        keys::encode_node_key("c1", "P1").unwrap(),
        keys::encode_node_key("c2", "P1").unwrap(),
    ];
    history.sort();

    let crawls: Vec<String> = history
        .iter()
        .map(|k| keys::decode_node_key(k).unwrap().0)
        .collect();
    assert_eq!(crawls, ["c1", "c2", "c3"]);
    assert!(history.iter().all(|k| range.contains(k)));
    assert!(!range.contains(&keys::encode_node_key("c1", "P10").unwrap()));
}

#[test]
fn test_range_rejects_invalid_ids() {
    assert!(KeyRange::crawl("").is_err());
    assert!(KeyRange::outbound("c1", "a!b").is_err());
}

// =============================================================================
// Whole-table Ranges
// =============================================================================

#[test]
fn test_time_ranges_cover_raw_keys() {
    let first = Utc.timestamp_millis_opt(0).single().unwrap();
    let late = Utc.timestamp_millis_opt(253_402_300_799_000).single().unwrap();
    for t in [first, late] {
        let key = keys::encode_time_range_key(&t, &t).unwrap();
        assert!(KeyRange::time_ranges().contains(&key));
    }
}

#[test]
fn test_full_range_covers_legal_ids() {
    let range = KeyRange::full();
    assert!(range.contains("\""));
    assert!(range.contains("~~~~"));
    assert!(range.contains("2015-06-01T00:00:00.000Z"));
}
