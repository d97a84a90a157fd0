//! Row encoding and decoding
//!
//! Text cells only: numbers as decimal, structured values as JSON, absent
//! optional values as [`NOT_PRESENT`].

use std::fmt::Display;
use std::str::FromStr;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use crate::error::{CrawlError, Result};
use crate::keys;
use crate::normalize::Row;
use crate::schema::{Table, NOT_PRESENT};
use crate::store::Cells;
use super::{
    ConnectionEdge, CrawlInfo, CrawlMeta, NodeHistoryEntry, NodeSnapshot, NodeState, NodeStats,
    RawCrawl, StoredRawCrawl,
};

// =============================================================================
// Writer / Reader
// =============================================================================

/// Builds the cells of one row through the schema registry
pub(crate) struct RowWriter {
    table: Table,
    cells: Cells,
}

impl RowWriter {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            cells: Cells::new(),
        }
    }

    pub fn text(&mut self, field: &str, value: &str) -> Result<&mut Self> {
        let column = self.table.column(field)?;
        self.cells.insert(column, Bytes::from(value.to_string()));
        Ok(self)
    }

    pub fn optional(&mut self, field: &str, value: Option<&str>) -> Result<&mut Self> {
        self.text(field, value.unwrap_or(NOT_PRESENT))
    }

    pub fn number<T: Display>(&mut self, field: &str, value: T) -> Result<&mut Self> {
        self.text(field, &value.to_string())
    }

    pub fn optional_number<T: Display>(&mut self, field: &str, value: Option<T>) -> Result<&mut Self> {
        match value {
            Some(v) => self.number(field, v),
            None => self.text(field, NOT_PRESENT),
        }
    }

    pub fn json(&mut self, field: &str, value: &Value) -> Result<&mut Self> {
        let encoded = serde_json::to_string(value)?;
        self.text(field, &encoded)
    }

    pub fn finish(self) -> Cells {
        self.cells
    }
}

/// Reads fields of a normalized row through the schema registry
pub(crate) struct FieldReader<'a> {
    table: Table,
    row: &'a Row,
}

impl<'a> FieldReader<'a> {
    pub fn new(table: Table, row: &'a Row) -> Self {
        Self { table, row }
    }

    pub fn key(&self) -> &'a str {
        &self.row.key
    }

    pub fn text(&self, field: &str) -> Result<&'a str> {
        self.row.require(&self.table.column(field)?)
    }

    /// Missing column and the placeholder both read as `None`
    pub fn optional(&self, field: &str) -> Result<Option<String>> {
        let column = self.table.column(field)?;
        Ok(self
            .row
            .get(&column)
            .filter(|v| *v != NOT_PRESENT)
            .map(str::to_string))
    }

    pub fn parse<T>(&self, field: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.row.parse(&self.table.column(field)?)
    }

    pub fn optional_parse<T>(&self, field: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(field)? {
            Some(_) => self.parse(field).map(Some),
            None => Ok(None),
        }
    }

    pub fn json(&self, field: &str) -> Result<Value> {
        let column = self.table.column(field)?;
        let text = self.row.require(&column)?;
        serde_json::from_str(text).map_err(|e| CrawlError::Decode {
            key: self.row.key.clone(),
            column,
            reason: e.to_string(),
        })
    }

    fn decode_error(&self, column: &str, reason: String) -> CrawlError {
        CrawlError::Decode {
            key: self.row.key.clone(),
            column: column.to_string(),
            reason,
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ`
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// =============================================================================
// Per-table encoders / decoders
// =============================================================================

impl RawCrawl {
    pub(crate) fn to_cells(&self) -> Result<Cells> {
        let mut row = RowWriter::new(Table::RawCrawls);
        row.text("entry_ipp", &self.entry)?
            .json("data", &self.data)?
            .json("exceptions", &self.errors)?;
        Ok(row.finish())
    }
}

impl StoredRawCrawl {
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let fields = FieldReader::new(Table::RawCrawls, row);
        let (start, end) = keys::decode_time_range_key(fields.key())?;
        Ok(Self {
            key: row.key.clone(),
            start,
            end,
            entry: fields.optional("entry_ipp")?,
            data: fields.json("data")?,
            errors: fields.json("exceptions")?,
        })
    }
}

impl CrawlInfo {
    pub(crate) fn cells_for(meta: &CrawlMeta) -> Result<Cells> {
        let mut row = RowWriter::new(Table::Crawls);
        row.optional("entry", meta.entry.as_deref())?;
        Ok(row.finish())
    }

    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let fields = FieldReader::new(Table::Crawls, row);
        Ok(Self {
            crawl_key: row.key.clone(),
            entry: fields.optional("entry")?,
        })
    }
}

impl NodeHistoryEntry {
    pub(crate) fn cells_for(node: &NodeSnapshot) -> Result<Cells> {
        let mut row = RowWriter::new(Table::Nodes);
        row.optional("ipp", node.ipp.as_deref())?
            .optional("version", node.version.as_deref())?;
        Ok(row.finish())
    }

    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let fields = FieldReader::new(Table::Nodes, row);
        let (crawl_key, pubkey) = keys::decode_node_key(fields.key())?;
        Ok(Self {
            pubkey,
            crawl_key,
            ipp: fields.optional("ipp")?,
            version: fields.optional("version")?,
        })
    }
}

impl NodeState {
    pub(crate) fn cells_for(node: &NodeSnapshot, now: &DateTime<Utc>) -> Result<Cells> {
        let mut row = RowWriter::new(Table::NodeState);
        row.optional("ipp", node.ipp.as_deref())?
            .optional("version", node.version.as_deref())?
            .text("last_updated", &format_timestamp(now))?;
        Ok(row.finish())
    }

    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let fields = FieldReader::new(Table::NodeState, row);
        let raw = fields.text("last_updated")?;
        let last_updated = DateTime::parse_from_rfc3339(raw)
            .map_err(|e| fields.decode_error("n:last_updated", e.to_string()))?
            .with_timezone(&Utc);
        Ok(Self {
            pubkey: row.key.clone(),
            ipp: fields.optional("ipp")?,
            version: fields.optional("version")?,
            last_updated,
        })
    }
}

impl NodeStats {
    pub(crate) fn to_cells(&self) -> Result<Cells> {
        let mut row = RowWriter::new(Table::CrawlNodeStats);
        row.text("pubkey", &self.pubkey)?
            .optional("ipp", self.ipp.as_deref())?
            .optional("version", self.version.as_deref())?
            .optional_number("uptime", self.uptime)?
            .optional_number("request_time", self.request_time)?
            .json("exceptions", &self.exceptions)?
            .number("in_count", self.in_count)?
            .number("out_count", self.out_count)?
            .number("in_add_count", self.in_add_count)?
            .number("in_drop_count", self.in_drop_count)?
            .number("out_add_count", self.out_add_count)?
            .number("out_drop_count", self.out_drop_count)?;
        Ok(row.finish())
    }

    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let fields = FieldReader::new(Table::CrawlNodeStats, row);
        let (_, key_pubkey) = keys::decode_stats_key(fields.key())?;
        let pubkey = fields.text("pubkey")?;
        if pubkey != key_pubkey {
            return Err(fields.decode_error(
                "s:pubkey",
                format!("pubkey {:?} does not match row key", pubkey),
            ));
        }
        Ok(Self {
            pubkey: key_pubkey,
            ipp: fields.optional("ipp")?,
            version: fields.optional("version")?,
            uptime: fields.optional_parse("uptime")?,
            request_time: fields.optional_parse("request_time")?,
            exceptions: fields.json("exceptions")?,
            in_count: fields.parse("in_count")?,
            out_count: fields.parse("out_count")?,
            in_add_count: fields.parse("in_add_count")?,
            in_drop_count: fields.parse("in_drop_count")?,
            out_add_count: fields.parse("out_add_count")?,
            out_drop_count: fields.parse("out_drop_count")?,
        })
    }
}

impl ConnectionEdge {
    pub(crate) fn cells_for(to: &str) -> Result<Cells> {
        let mut row = RowWriter::new(Table::Connections);
        row.text("to", to)?;
        Ok(row.finish())
    }

    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let fields = FieldReader::new(Table::Connections, row);
        let (crawl_key, from, to) = keys::decode_connection_key(fields.key())?;
        if fields.text("to")? != to {
            return Err(fields.decode_error("cn:to", "target does not match row key".to_string()));
        }
        Ok(Self {
            crawl_key,
            from,
            to,
        })
    }
}
