//! Write paths

use std::collections::BTreeMap;
use chrono::Utc;
use tracing::{debug, error, info};
use crate::delta::CrawlDelta;
use crate::error::{CrawlError, Result, WriteGroup};
use crate::keys;
use crate::model::{ConnectionEdge, CrawlInfo, NodeHistoryEntry, NodeState, ProcessedCrawl, RawCrawl};
use crate::schema::Table;
use crate::store::{Cells, ColumnStore};
use super::CrawlRepository;

type Rows = BTreeMap<String, Cells>;

/// Every row a processed crawl writes, keyed and encoded before any I/O
struct CrawlRows {
    history: Rows,
    state: Rows,
    stats: Rows,
    connections: Rows,
}

impl CrawlRows {
    fn build(crawl_key: &str, new: &ProcessedCrawl, delta: &CrawlDelta<'_>) -> Result<Self> {
        let now = Utc::now();
        let mut history = Rows::new();
        for (pubkey, node) in &delta.changed_nodes {
            history.insert(
                keys::encode_node_key(crawl_key, pubkey)?,
                NodeHistoryEntry::cells_for(node)?,
            );
        }

        // Every observed node gets a fresh state row, changed or not
        let mut state = Rows::new();
        for (pubkey, node) in &new.nodes {
            keys::validate_id(pubkey)?;
            state.insert(pubkey.clone(), NodeState::cells_for(node, &now)?);
        }

        let mut stats = Rows::new();
        for (pubkey, node_stats) in &delta.node_stats {
            stats.insert(keys::encode_stats_key(crawl_key, pubkey)?, node_stats.to_cells()?);
        }

        let mut connections = Rows::new();
        for pair in new.connections.keys() {
            let (from, to) = keys::parse_connection_pair(pair)?;
            connections.insert(
                keys::encode_connection_key(crawl_key, from, to)?,
                ConnectionEdge::cells_for(to)?,
            );
        }

        Ok(Self {
            history,
            state,
            stats,
            connections,
        })
    }
}

impl<S: ColumnStore> CrawlRepository<S> {
    fn put_rows(&self, table: Table, rows: &Rows) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        debug!(table = %table, rows = rows.len(), "put rows");
        self.store.put_rows(table.name(), rows)
    }

    /// Store a raw crawl under its time range key and return the key
    pub fn store_raw_crawl(&self, crawl: &RawCrawl) -> Result<String> {
        let key = keys::encode_time_range_key(&crawl.start, &crawl.end)?;
        self.store
            .put_row(Table::RawCrawls.name(), &key, &crawl.to_cells()?)?;
        info!(key = %key, entry = %crawl.entry, "stored raw crawl");
        Ok(key)
    }

    /// Store a processed crawl and everything derived from it
    ///
    /// `old` is the previously stored crawl, if any; node history and
    /// add/drop counts are computed against it. Returns the crawl key.
    ///
    /// Not atomic: when any write group fails the call fails with
    /// `PartialWriteFailure`, the `crawls` summary row is not written, and
    /// rows already written by the other groups stay.
    pub fn store_processed_crawl(
        &self,
        new: &ProcessedCrawl,
        old: Option<&ProcessedCrawl>,
    ) -> Result<String> {
        let crawl_key = new.crawl.id.as_str();
        keys::validate_id(crawl_key)?;

        let delta = CrawlDelta::compute(new, old)?;
        let rows = CrawlRows::build(crawl_key, new, &delta)?;
        debug!(
            crawl = crawl_key,
            nodes = new.nodes.len(),
            changed = rows.history.len(),
            connections = rows.connections.len(),
            "processed crawl delta computed"
        );

        let outcomes = crossbeam::scope(|s| {
            let nodes = s.spawn(|_| {
                self.put_rows(Table::Nodes, &rows.history)?;
                self.put_rows(Table::NodeState, &rows.state)
            });
            let stats = s.spawn(|_| self.put_rows(Table::CrawlNodeStats, &rows.stats));
            let connections = s.spawn(|_| self.put_rows(Table::Connections, &rows.connections));
            [
                (WriteGroup::Nodes, nodes.join()),
                (WriteGroup::NodeStats, stats.join()),
                (WriteGroup::Connections, connections.join()),
            ]
        })
        .map_err(|_| CrawlError::StoreUnavailable("write group scope panicked".to_string()))?;

        let mut first_failure = None;
        for (group, outcome) in outcomes {
            let result = outcome.unwrap_or_else(|_| {
                Err(CrawlError::StoreUnavailable(format!("{} writer panicked", group)))
            });
            if let Err(e) = result {
                error!(crawl = crawl_key, group = %group, error = %e, "write group failed");
                first_failure.get_or_insert((group, e));
            }
        }
        if let Some((group, source)) = first_failure {
            return Err(CrawlError::PartialWriteFailure {
                crawl_key: crawl_key.to_string(),
                group,
                source: Box::new(source),
            });
        }

        self.store.put_row(
            Table::Crawls.name(),
            crawl_key,
            &CrawlInfo::cells_for(&new.crawl)?,
        )?;
        info!(
            crawl = crawl_key,
            nodes = new.nodes.len(),
            changed = rows.history.len(),
            connections = rows.connections.len(),
            "stored processed crawl"
        );
        Ok(crawl_key.to_string())
    }
}
