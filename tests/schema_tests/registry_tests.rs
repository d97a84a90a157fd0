//! Tests for the schema registry
//!
//! These tests verify:
//! - Table names are unique and resolvable
//! - Column names are built only for registered fields
//! - Descriptors carry the table's single column family

use std::collections::BTreeSet;
use crawlstore::schema::{split_column, Table, TableDescriptor};
use crawlstore::CrawlError;

#[test]
fn test_table_names_are_unique() {
    let names: BTreeSet<_> = Table::ALL.iter().map(|t| t.name()).collect();
    assert_eq!(names.len(), Table::ALL.len());
}

#[test]
fn test_from_name_round_trips() {
    for table in Table::ALL {
        assert_eq!(Table::from_name(table.name()), Some(table));
    }
    assert_eq!(Table::from_name("missing"), None);
}

#[test]
fn test_column_qualifies_registered_fields() {
    assert_eq!(Table::Connections.column("to").unwrap(), "cn:to");
    assert_eq!(Table::NodeState.column("last_updated").unwrap(), "n:last_updated");
    assert_eq!(Table::CrawlNodeStats.column("in_add_count").unwrap(), "s:in_add_count");
}

#[test]
fn test_column_rejects_unregistered_fields() {
    let err = Table::Nodes.column("uptime").unwrap_err();
    assert!(matches!(err, CrawlError::Schema(_)));
}

#[test]
fn test_descriptor_has_single_family() {
    assert_eq!(
        Table::RawCrawls.descriptor(),
        TableDescriptor::new("raw_crawls", ["rc"])
    );
    assert_eq!(Table::NodeState.descriptor().column_families.len(), 1);
}

#[test]
fn test_split_column() {
    assert_eq!(split_column("cn:to"), Some(("cn", "to")));
    assert_eq!(split_column("plain"), None);
}
