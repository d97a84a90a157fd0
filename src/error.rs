//! Error types for crawlstore
//!
//! Provides a unified error type for all operations.

use std::fmt;
use thiserror::Error;

/// Result type alias using CrawlError
pub type Result<T> = std::result::Result<T, CrawlError>;

/// The three independent write groups of a processed-crawl store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteGroup {
    /// Node history rows plus node state rows
    Nodes,
    /// Per-crawl node statistics rows
    NodeStats,
    /// Per-crawl connection edge rows
    Connections,
}

impl fmt::Display for WriteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteGroup::Nodes => "nodes",
            WriteGroup::NodeStats => "node_stats",
            WriteGroup::Connections => "connections",
        };
        f.write_str(name)
    }
}

/// Unified error type for crawlstore operations
#[derive(Debug, Error)]
pub enum CrawlError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("No row '{key}' in table '{table}'")]
    NotFound { table: String, key: String },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Unknown column family '{family}' for table '{table}'")]
    UnknownColumnFamily { table: String, family: String },

    #[error("Invalid filter string: {0}")]
    InvalidFilter(String),

    // -------------------------------------------------------------------------
    // Key-space / Schema Errors
    // -------------------------------------------------------------------------
    #[error("Malformed row key: {0}")]
    KeyFormat(String),

    #[error("Schema error: {0}")]
    Schema(String),

    // -------------------------------------------------------------------------
    // Read-path Errors
    // -------------------------------------------------------------------------
    #[error("Cannot decode column '{column}' of row '{key}': {reason}")]
    Decode {
        key: String,
        column: String,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Write-path Errors
    // -------------------------------------------------------------------------
    #[error("Crawl {crawl_key}: write group '{group}' failed: {source}")]
    PartialWriteFailure {
        crawl_key: String,
        group: WriteGroup,
        #[source]
        source: Box<CrawlError>,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Caller / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CrawlError {
    /// True for a point lookup that matched no row
    pub fn is_not_found(&self) -> bool {
        matches!(self, CrawlError::NotFound { .. })
    }
}

impl From<serde_json::Error> for CrawlError {
    fn from(err: serde_json::Error) -> Self {
        CrawlError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for CrawlError {
    fn from(err: bincode::Error) -> Self {
        CrawlError::Serialization(err.to_string())
    }
}
