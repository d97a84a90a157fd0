//! Tests for LogStore
//!
//! These tests verify:
//! - Tables and rows survive a reopen
//! - Rejected mutations fail without reaching the WAL
//! - Deleted tables stay deleted after replay
//! - Invalid sync configuration is refused

use std::path::Path;
use bytes::Bytes;
use crawlstore::config::WalSyncStrategy;
use crawlstore::keys::KeyRange;
use crawlstore::schema::TableDescriptor;
use crawlstore::store::{Cells, ColumnStore, LogStore, ScanRequest};
use crawlstore::{Config, CrawlError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config(dir: &Path) -> Config {
    Config::builder()
        .data_dir(dir)
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .build()
}

fn cells(value: &str) -> Cells {
    let mut cells = Cells::new();
    cells.insert("f:v".to_string(), Bytes::from(value.to_string()));
    cells
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_reopen_restores_tables_and_rows() {
    let temp = TempDir::new().unwrap();
    {
        let store = LogStore::open(&config(temp.path())).unwrap();
        store.create_table(&TableDescriptor::new("t", ["f"])).unwrap();
        store.put_row("t", "a", &cells("1")).unwrap();
        store.put_row("t", "b", &cells("2")).unwrap();
    }

    let store = LogStore::open(&config(temp.path())).unwrap();
    assert_eq!(store.recovery().entries_recovered, 3);
    let rows = store.scan(&ScanRequest::new("t", KeyRange::new("a", "z"))).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].cells["f:v"], Bytes::from("2"));
}

#[test]
fn test_rejected_mutations_are_not_logged() {
    let temp = TempDir::new().unwrap();
    let table = TableDescriptor::new("t", ["f"]);
    {
        let store = LogStore::open(&config(temp.path())).unwrap();
        assert!(matches!(
            store.put_row("missing", "a", &cells("1")),
            Err(CrawlError::UnknownTable(_))
        ));
        assert!(matches!(store.delete_table(&table), Err(CrawlError::UnknownTable(_))));
        store.create_table(&table).unwrap();
        assert!(matches!(store.create_table(&table), Err(CrawlError::TableExists(_))));

        let mut bad = Cells::new();
        bad.insert("g:v".to_string(), Bytes::from("1"));
        assert!(store.put_row("t", "a", &bad).is_err());
    }

    let store = LogStore::open(&config(temp.path())).unwrap();
    assert_eq!(store.recovery().entries_recovered, 1);
    assert_eq!(store.memory().table_names(), vec!["t".to_string()]);
    assert_eq!(store.memory().row_count("t").unwrap(), 0);
}

#[test]
fn test_deleted_table_stays_deleted() {
    let temp = TempDir::new().unwrap();
    let table = TableDescriptor::new("t", ["f"]);
    {
        let store = LogStore::open(&config(temp.path())).unwrap();
        store.create_table(&table).unwrap();
        store.put_row("t", "a", &cells("1")).unwrap();
        store.delete_table(&table).unwrap();
    }

    let store = LogStore::open(&config(temp.path())).unwrap();
    assert!(store.memory().table_names().is_empty());
}

#[test]
fn test_wal_lives_in_data_dir() {
    let temp = TempDir::new().unwrap();
    let store = LogStore::open_path(temp.path()).unwrap();
    assert_eq!(store.wal_path(), temp.path().join("store.wal"));
    assert!(store.wal_path().exists());
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_zero_sync_interval_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .wal_sync_strategy(WalSyncStrategy::EveryNEntries { count: 0 })
        .build();
    assert!(matches!(LogStore::open(&config), Err(CrawlError::Config(_))));
}
