//! In-memory wide-column store
//!
//! BTreeMap-based tables with RwLock for concurrency.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use parking_lot::RwLock;
use crate::error::{CrawlError, Result};
use crate::schema::{split_column, TableDescriptor};
use super::filter::parse_filter_string;
use super::{Cells, ColumnStore, RawRow, ScanRequest};

/// One table: its families and its rows in key order
#[derive(Debug, Default)]
struct TableData {
    families: BTreeSet<String>,
    rows: BTreeMap<String, Cells>,
}

impl TableData {
    fn check_families(&self, table: &str, cells: &Cells) -> Result<()> {
        for column in cells.keys() {
            let family = split_column(column).map(|(f, _)| f).unwrap_or(column.as_str());
            if !self.families.contains(family) {
                return Err(CrawlError::UnknownColumnFamily {
                    table: table.to_string(),
                    family: family.to_string(),
                });
            }
        }
        Ok(())
    }

    fn merge(&mut self, row_key: &str, cells: &Cells) {
        let row = self.rows.entry(row_key.to_string()).or_default();
        for (column, value) in cells {
            row.insert(column.clone(), value.clone());
        }
    }
}

/// Sorted, in-process store
///
/// ## Concurrency:
/// - All tables sit behind one `RwLock`: scans and gets share it, writes
///   take it exclusively, so a `put_rows` call is never observed half-done
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, TableData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(BTreeMap::new()),
        }
    }

    /// Names of the existing tables
    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.read().contains_key(table)
    }

    /// Check that `table` exists and accepts every column of `rows`
    pub fn check_rows(&self, table: &str, rows: &BTreeMap<String, Cells>) -> Result<()> {
        let tables = self.tables.read();
        let data = tables
            .get(table)
            .ok_or_else(|| CrawlError::UnknownTable(table.to_string()))?;
        rows.values()
            .try_for_each(|cells| data.check_families(table, cells))
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read();
        let data = tables
            .get(table)
            .ok_or_else(|| CrawlError::UnknownTable(table.to_string()))?;
        Ok(data.rows.len())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnStore for MemoryStore {
    fn create_table(&self, table: &TableDescriptor) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(&table.name) {
            return Err(CrawlError::TableExists(table.name.clone()));
        }
        tables.insert(
            table.name.clone(),
            TableData {
                families: table.column_families.clone(),
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn delete_table(&self, table: &TableDescriptor) -> Result<()> {
        self.tables
            .write()
            .remove(&table.name)
            .map(|_| ())
            .ok_or_else(|| CrawlError::UnknownTable(table.name.clone()))
    }

    fn put_row(&self, table: &str, row_key: &str, columns: &Cells) -> Result<()> {
        let mut tables = self.tables.write();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| CrawlError::UnknownTable(table.to_string()))?;
        data.check_families(table, columns)?;
        data.merge(row_key, columns);
        Ok(())
    }

    fn put_rows(&self, table: &str, rows: &BTreeMap<String, Cells>) -> Result<()> {
        let mut tables = self.tables.write();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| CrawlError::UnknownTable(table.to_string()))?;

        // Validate everything first so a bad row leaves the table untouched
        for cells in rows.values() {
            data.check_families(table, cells)?;
        }
        for (row_key, cells) in rows {
            data.merge(row_key, cells);
        }
        Ok(())
    }

    fn get_row(&self, table: &str, row_key: &str) -> Result<RawRow> {
        let tables = self.tables.read();
        let data = tables
            .get(table)
            .ok_or_else(|| CrawlError::UnknownTable(table.to_string()))?;
        data.rows
            .get(row_key)
            .map(|cells| RawRow {
                key: row_key.to_string(),
                cells: cells.clone(),
            })
            .ok_or_else(|| CrawlError::NotFound {
                table: table.to_string(),
                key: row_key.to_string(),
            })
    }

    fn scan(&self, request: &ScanRequest) -> Result<Vec<RawRow>> {
        let filters = match &request.filter {
            Some(filter) => parse_filter_string(filter)?,
            None => Vec::new(),
        };

        let tables = self.tables.read();
        let data = tables
            .get(&request.table)
            .ok_or_else(|| CrawlError::UnknownTable(request.table.clone()))?;

        if request.start_row >= request.stop_row {
            return Ok(Vec::new());
        }
        let range = data.rows.range::<str, _>((
            Bound::Included(request.start_row.as_str()),
            Bound::Excluded(request.stop_row.as_str()),
        ));
        let limit = request.limit.unwrap_or(usize::MAX);
        let keep = |(_, cells): &(&String, &Cells)| filters.iter().all(|f| f.matches(cells));
        let to_row = |(key, cells): (&String, &Cells)| RawRow {
            key: key.clone(),
            cells: cells.clone(),
        };

        let rows = if request.descending {
            range.rev().filter(keep).take(limit).map(to_row).collect()
        } else {
            range.filter(keep).take(limit).map(to_row).collect()
        };
        Ok(rows)
    }
}
