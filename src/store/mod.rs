//! Store Module
//!
//! The wide-column store capability the repository is written against,
//! plus two implementations.
//!
//! ## Responsibilities
//! - Table lifecycle (create/delete by descriptor)
//! - Row writes, merged per column (`family:qualifier` → bytes)
//! - Point reads and `[start, stop)` range scans with optional
//!   server-side column value filters
//!
//! ## Implementations
//! ```text
//! ┌──────────────┐      ┌──────────────┐
//! │   LogStore   │─────▶│  WAL (file)  │  append + fsync, replay on open
//! └──────┬───────┘      └──────────────┘
//!        │ applies
//!        ▼
//! ┌──────────────┐
//! │ MemoryStore  │  BTreeMap per table behind one RwLock
//! └──────────────┘
//! ```

mod filter;
mod log;
mod memory;
pub mod wal;

use std::collections::BTreeMap;
use std::sync::Arc;
use bytes::Bytes;
use crate::error::Result;
use crate::keys::KeyRange;
use crate::schema::TableDescriptor;

pub use filter::{build_filter_string, parse_filter_string, ColumnValueFilter, CompareOp};
pub use log::LogStore;
pub use memory::MemoryStore;

/// Column name (`family:qualifier`) → cell value
pub type Cells = BTreeMap<String, Bytes>;

/// A row as the store returns it: undecoded cell bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub key: String,
    pub cells: Cells,
}

/// A range scan over one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub table: String,
    /// Inclusive
    pub start_row: String,
    /// Exclusive
    pub stop_row: String,
    /// Iterate `[start_row, stop_row)` from the top down
    pub descending: bool,
    pub limit: Option<usize>,
    /// Pre-built filter string, see [`build_filter_string`]
    pub filter: Option<String>,
}

impl ScanRequest {
    pub fn new(table: impl Into<String>, range: KeyRange) -> Self {
        Self {
            table: table.into(),
            start_row: range.start,
            stop_row: range.stop,
            descending: false,
            limit: None,
            filter: None,
        }
    }

    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Wide-column store capability
///
/// Every call either fully succeeds or fails; a failed `put_rows` leaves no
/// partial rows behind. Nothing is retried.
pub trait ColumnStore: Send + Sync {
    fn create_table(&self, table: &TableDescriptor) -> Result<()>;

    fn delete_table(&self, table: &TableDescriptor) -> Result<()>;

    fn put_row(&self, table: &str, row_key: &str, columns: &Cells) -> Result<()>;

    fn put_rows(&self, table: &str, rows: &BTreeMap<String, Cells>) -> Result<()>;

    /// Fails with `CrawlError::NotFound` when the row does not exist
    fn get_row(&self, table: &str, row_key: &str) -> Result<RawRow>;

    fn scan(&self, request: &ScanRequest) -> Result<Vec<RawRow>>;

    fn build_single_column_value_filters(&self, specs: &[ColumnValueFilter]) -> String {
        build_filter_string(specs)
    }
}

impl<S: ColumnStore + ?Sized> ColumnStore for Arc<S> {
    fn create_table(&self, table: &TableDescriptor) -> Result<()> {
        (**self).create_table(table)
    }

    fn delete_table(&self, table: &TableDescriptor) -> Result<()> {
        (**self).delete_table(table)
    }

    fn put_row(&self, table: &str, row_key: &str, columns: &Cells) -> Result<()> {
        (**self).put_row(table, row_key, columns)
    }

    fn put_rows(&self, table: &str, rows: &BTreeMap<String, Cells>) -> Result<()> {
        (**self).put_rows(table, rows)
    }

    fn get_row(&self, table: &str, row_key: &str) -> Result<RawRow> {
        (**self).get_row(table, row_key)
    }

    fn scan(&self, request: &ScanRequest) -> Result<Vec<RawRow>> {
        (**self).scan(request)
    }

    fn build_single_column_value_filters(&self, specs: &[ColumnValueFilter]) -> String {
        (**self).build_single_column_value_filters(specs)
    }
}
