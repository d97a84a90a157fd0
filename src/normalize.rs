//! Normalizer
//!
//! Turns raw store rows (cell bytes) into decoded text rows. Every read path
//! goes through here, for one row or many.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use crate::error::{CrawlError, Result};
use crate::store::RawRow;

/// A row whose cell values have been decoded to text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub key: String,
    /// `family:qualifier` → decoded value
    pub columns: BTreeMap<String, String>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Value of a column that must be present
    pub fn require(&self, column: &str) -> Result<&str> {
        self.get(column).ok_or_else(|| CrawlError::Decode {
            key: self.key.clone(),
            column: column.to_string(),
            reason: "column missing".to_string(),
        })
    }

    /// Parse a required column with `FromStr`
    pub fn parse<T>(&self, column: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.require(column)?
            .parse()
            .map_err(|e: T::Err| CrawlError::Decode {
                key: self.key.clone(),
                column: column.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Decode every cell of one row
pub fn normalize_row(raw: RawRow) -> Result<Row> {
    let RawRow { key, cells } = raw;
    let mut columns = BTreeMap::new();
    for (column, value) in cells {
        let text = String::from_utf8(value.to_vec()).map_err(|e| CrawlError::Decode {
            key: key.clone(),
            column: column.clone(),
            reason: e.to_string(),
        })?;
        columns.insert(column, text);
    }
    Ok(Row { key, columns })
}

/// Decode every cell of every row, preserving order
pub fn normalize_rows(raw: Vec<RawRow>) -> Result<Vec<Row>> {
    raw.into_iter().map(normalize_row).collect()
}
