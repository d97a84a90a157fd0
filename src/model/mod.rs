//! Model Module
//!
//! Typed records for every table. Raw column names and cell bytes only exist
//! inside [`rows`], at the store boundary.

mod rows;

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A crawl result as produced by the crawler, stored verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCrawl {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Address the crawl started from
    pub entry: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub errors: Value,
}

/// A raw crawl read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRawCrawl {
    /// Time range row key
    pub key: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub entry: Option<String>,
    pub data: Value,
    pub errors: Value,
}

/// Identity and bounds of a processed crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlMeta {
    /// Caller-supplied crawl key; must sort in crawl order
    pub id: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entry: Option<String>,
}

/// What one crawl observed about one node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// `ip:port` the node was reached at
    #[serde(default)]
    pub ipp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub uptime: Option<u64>,
    /// Milliseconds the crawler's request took
    #[serde(default)]
    pub request_time: Option<u64>,
    #[serde(default)]
    pub errors: Value,
    #[serde(rename = "in", default)]
    pub in_count: u32,
    #[serde(rename = "out", default)]
    pub out_count: u32,
}

/// A fully processed crawl: nodes by pubkey, edges by `"from,to"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedCrawl {
    pub crawl: CrawlMeta,
    #[serde(default, alias = "rippleds")]
    pub nodes: BTreeMap<String, NodeSnapshot>,
    #[serde(default)]
    pub connections: BTreeMap<String, Value>,
}

/// Per-node statistics for one crawl, including the delta to the prior crawl
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeStats {
    pub pubkey: String,
    pub ipp: Option<String>,
    pub version: Option<String>,
    pub uptime: Option<u64>,
    pub request_time: Option<u64>,
    pub exceptions: Value,
    pub in_count: u32,
    pub out_count: u32,
    pub in_add_count: usize,
    pub in_drop_count: usize,
    pub out_add_count: usize,
    pub out_drop_count: usize,
}

/// Latest known state of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub pubkey: String,
    pub ipp: Option<String>,
    pub version: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// A node's address/version as of the crawl in which it first appeared or changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHistoryEntry {
    pub pubkey: String,
    pub crawl_key: String,
    pub ipp: Option<String>,
    pub version: Option<String>,
}

/// A directed link observed in one crawl
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionEdge {
    pub crawl_key: String,
    pub from: String,
    pub to: String,
}

/// Summary row of a processed crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlInfo {
    pub crawl_key: String,
    pub entry: Option<String>,
}
