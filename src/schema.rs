//! Schema Registry
//!
//! Static description of every table the repository writes: table name,
//! its single column family, and the qualifiers stored under that family.
//! Row encoders and decoders build column names through this registry only.

use std::collections::BTreeSet;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{CrawlError, Result};

/// Placeholder stored when an optional text field is absent
pub const NOT_PRESENT: &str = "not_present";

/// Table descriptor handed to the store for create/delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub column_families: BTreeSet<String>,
}

impl TableDescriptor {
    pub fn new<I, F>(name: impl Into<String>, families: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            name: name.into(),
            column_families: families.into_iter().map(Into::into).collect(),
        }
    }
}

/// Every table of the crawl keyspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    /// Processed crawl summary, one row per crawl key
    Crawls,
    /// Directed edges, one row per (crawl, from, to)
    Connections,
    /// Per-node statistics, one row per (crawl, pubkey)
    CrawlNodeStats,
    /// Raw crawl payloads keyed by time range
    RawCrawls,
    /// Sparse node change log keyed by (pubkey, crawl)
    Nodes,
    /// Latest known state, one row per pubkey
    NodeState,
}

impl Table {
    /// All tables, in creation order
    pub const ALL: [Table; 6] = [
        Table::Crawls,
        Table::Connections,
        Table::CrawlNodeStats,
        Table::RawCrawls,
        Table::Nodes,
        Table::NodeState,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Crawls => "crawls",
            Table::Connections => "connections",
            Table::CrawlNodeStats => "crawl_node_stats",
            Table::RawCrawls => "raw_crawls",
            Table::Nodes => "nodes",
            Table::NodeState => "node_state",
        }
    }

    pub fn family(self) -> &'static str {
        match self {
            Table::Crawls => "c",
            Table::Connections => "cn",
            Table::CrawlNodeStats => "s",
            Table::RawCrawls => "rc",
            Table::Nodes | Table::NodeState => "n",
        }
    }

    /// Qualifiers stored under this table's column family
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Table::Crawls => &["entry"],
            Table::Connections => &["to"],
            Table::CrawlNodeStats => &[
                "pubkey",
                "ipp",
                "version",
                "uptime",
                "request_time",
                "exceptions",
                "in_count",
                "out_count",
                "in_add_count",
                "in_drop_count",
                "out_add_count",
                "out_drop_count",
            ],
            Table::RawCrawls => &["entry_ipp", "data", "exceptions"],
            Table::Nodes => &["ipp", "version"],
            Table::NodeState => &["ipp", "version", "last_updated"],
        }
    }

    pub fn descriptor(self) -> TableDescriptor {
        TableDescriptor::new(self.name(), [self.family()])
    }

    /// Fully qualified `family:qualifier` column name for a registered field
    pub fn column(self, field: &str) -> Result<String> {
        if !self.fields().contains(&field) {
            return Err(CrawlError::Schema(format!(
                "table '{}' has no field '{}'",
                self.name(),
                field
            )));
        }
        Ok(format!("{}:{}", self.family(), field))
    }

    /// Look a table up by its store name
    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split a qualified column name into `(family, qualifier)`
pub fn split_column(column: &str) -> Option<(&str, &str)> {
    column.split_once(':')
}
