//! Repository Module
//!
//! The public read/write surface over a [`ColumnStore`].
//!
//! ## Responsibilities
//! - Create (or recreate) the crawl tables
//! - Store raw crawls and processed crawls, fanning processed crawls out
//!   over the node, stats, and connection tables
//! - Serve range and point reads as typed records
//!
//! ## Write Ordering (processed crawl)
//! ```text
//!            ┌─▶ nodes ─▶ node_state ─┐
//! delta ─────┼─▶ crawl_node_stats ────┼──▶ crawls (summary, last)
//!            └─▶ connections ─────────┘
//! ```
//! The three branches run concurrently; the summary row is only written when
//! all of them succeeded, so its presence marks a completed crawl. Nothing is
//! rolled back on failure.

mod read;
mod write;

use std::fmt;
use std::str::FromStr;
use tracing::debug;
use crate::config::Config;
use crate::error::{CrawlError, Result};
use crate::schema::Table;
use crate::store::{ColumnStore, LogStore};

/// Which edges of a node to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edges pointing at the node; needs a filtered scan of the whole crawl
    In,
    /// Edges leaving the node; a single key-range scan
    Out,
}

impl FromStr for Direction {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(CrawlError::InvalidArgument(format!(
                "direction must be 'in' or 'out', got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::In => "in",
            Direction::Out => "out",
        })
    }
}

/// Crawl persistence over a wide-column store
pub struct CrawlRepository<S> {
    store: S,
}

impl<S: ColumnStore> CrawlRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Create every table; with `recreate`, drop them first
    ///
    /// Tables that already exist are left as they are, so this is safe to
    /// call on every start.
    pub fn init_tables(&self, recreate: bool) -> Result<()> {
        if recreate {
            for table in Table::ALL {
                match self.store.delete_table(&table.descriptor()) {
                    Ok(()) => debug!(table = %table, "dropped table"),
                    Err(CrawlError::UnknownTable(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        for table in Table::ALL {
            match self.store.create_table(&table.descriptor()) {
                Ok(()) => debug!(table = %table, "created table"),
                Err(CrawlError::TableExists(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl CrawlRepository<LogStore> {
    /// Open the durable store under `config.data_dir` and make sure the
    /// tables exist
    pub fn open(config: &Config) -> Result<Self> {
        let repo = Self::new(LogStore::open(config)?);
        repo.init_tables(config.recreate_tables)?;
        Ok(repo)
    }
}
