//! Tests for MemoryStore
//!
//! These tests verify:
//! - Table creation and deletion errors
//! - Column merging on put and all-or-nothing batches
//! - Half-open, ordered, descending, limited and filtered scans

use std::collections::BTreeMap;
use bytes::Bytes;
use crawlstore::keys::KeyRange;
use crawlstore::schema::TableDescriptor;
use crawlstore::store::{Cells, ColumnStore, ColumnValueFilter, MemoryStore, ScanRequest};
use crawlstore::CrawlError;

// =============================================================================
// Helper Functions
// =============================================================================

fn cells(pairs: &[(&str, &str)]) -> Cells {
    pairs
        .iter()
        .map(|(c, v)| (c.to_string(), Bytes::from(v.to_string())))
        .collect()
}

fn store_with_table() -> MemoryStore {
    let store = MemoryStore::new();
    store.create_table(&TableDescriptor::new("t", ["f"])).unwrap();
    store
}

fn keys(store: &MemoryStore, request: ScanRequest) -> Vec<String> {
    store
        .scan(&request)
        .unwrap()
        .into_iter()
        .map(|r| r.key)
        .collect()
}

// =============================================================================
// Table Tests
// =============================================================================

#[test]
fn test_create_twice_fails() {
    let store = store_with_table();
    let err = store.create_table(&TableDescriptor::new("t", ["f"])).unwrap_err();
    assert!(matches!(err, CrawlError::TableExists(_)));
}

#[test]
fn test_delete_missing_table_fails() {
    let store = MemoryStore::new();
    let err = store.delete_table(&TableDescriptor::new("t", ["f"])).unwrap_err();
    assert!(matches!(err, CrawlError::UnknownTable(_)));
    assert!(!store.has_table("t"));
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_put_merges_columns() {
    let store = store_with_table();
    store.put_row("t", "r", &cells(&[("f:a", "1")])).unwrap();
    store.put_row("t", "r", &cells(&[("f:b", "2")])).unwrap();
    let row = store.get_row("t", "r").unwrap();
    assert_eq!(row.cells.len(), 2);
}

#[test]
fn test_unknown_family_rejects_whole_batch() {
    let store = store_with_table();
    let mut rows = BTreeMap::new();
    rows.insert("a".to_string(), cells(&[("f:x", "1")]));
    rows.insert("b".to_string(), cells(&[("g:x", "1")]));

    assert!(matches!(
        store.check_rows("t", &rows),
        Err(CrawlError::UnknownColumnFamily { .. })
    ));
    assert!(store.put_rows("t", &rows).is_err());
    assert_eq!(store.row_count("t").unwrap(), 0);
}

#[test]
fn test_get_missing_row_is_not_found() {
    let store = store_with_table();
    assert!(store.get_row("t", "nope").unwrap_err().is_not_found());
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_is_half_open_and_ordered() {
    let store = store_with_table();
    for key in ["a", "b", "c", "d"] {
        store.put_row("t", key, &cells(&[("f:v", key)])).unwrap();
    }

    assert_eq!(keys(&store, ScanRequest::new("t", KeyRange::new("b", "d"))), ["b", "c"]);
    assert_eq!(
        keys(&store, ScanRequest::new("t", KeyRange::new("a", "z")).descending().limit(2)),
        ["d", "c"]
    );
}

#[test]
fn test_scan_applies_filter_before_limit() {
    let store = store_with_table();
    store.put_row("t", "a", &cells(&[("f:to", "x")])).unwrap();
    store.put_row("t", "b", &cells(&[("f:to", "y")])).unwrap();
    store.put_row("t", "c", &cells(&[("f:to", "y")])).unwrap();

    let filter =
        store.build_single_column_value_filters(&[ColumnValueFilter::equals("f", "to", "y")]);
    let request = ScanRequest::new("t", KeyRange::new("a", "z")).filter(filter).limit(1);
    assert_eq!(keys(&store, request), ["b"]);
}

#[test]
fn test_inverted_range_is_empty() {
    let store = store_with_table();
    store.put_row("t", "m", &cells(&[("f:v", "1")])).unwrap();
    assert!(keys(&store, ScanRequest::new("t", KeyRange::new("z", "a"))).is_empty());
}

#[test]
fn test_scan_unknown_table_fails() {
    let store = MemoryStore::new();
    let err = store
        .scan(&ScanRequest::new("missing", KeyRange::full()))
        .unwrap_err();
    assert!(matches!(err, CrawlError::UnknownTable(_)));
}
