//! Read paths
//!
//! Every read builds a key range (or point key), goes to the store, and
//! passes the result through the normalizer before decoding typed records.

use tracing::debug;
use crate::error::Result;
use crate::keys::{self, KeyRange};
use crate::model::{ConnectionEdge, CrawlInfo, NodeHistoryEntry, NodeState, NodeStats, StoredRawCrawl};
use crate::normalize::{normalize_row, normalize_rows, Row};
use crate::schema::Table;
use crate::store::{ColumnStore, ColumnValueFilter, ScanRequest};
use super::{CrawlRepository, Direction};

impl<S: ColumnStore> CrawlRepository<S> {
    /// Generic scan used by every range read
    fn get_rows(&self, request: ScanRequest) -> Result<Vec<Row>> {
        debug!(
            table = %request.table,
            start = %request.start_row,
            stop = %request.stop_row,
            descending = request.descending,
            limit = ?request.limit,
            filtered = request.filter.is_some(),
            "scan"
        );
        normalize_rows(self.store.scan(&request)?)
    }

    /// Point read; a missing row is `Ok(None)`
    fn get_row(&self, table: Table, key: &str) -> Result<Option<Row>> {
        match self.store.get_row(table.name(), key) {
            Ok(raw) => normalize_row(raw).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The raw crawl with the greatest time range key
    pub fn get_latest_raw_crawl(&self) -> Result<Option<StoredRawCrawl>> {
        let request = ScanRequest::new(Table::RawCrawls.name(), KeyRange::time_ranges())
            .descending()
            .limit(1);
        self.get_rows(request)?
            .first()
            .map(StoredRawCrawl::from_row)
            .transpose()
    }

    pub fn get_raw_crawl_by_key(&self, key: &str) -> Result<Option<StoredRawCrawl>> {
        keys::decode_time_range_key(key)?;
        self.get_row(Table::RawCrawls, key)?
            .as_ref()
            .map(StoredRawCrawl::from_row)
            .transpose()
    }

    /// Summary of one crawl, or of the most recent crawl when `crawl_key` is `None`
    pub fn get_crawl_info(&self, crawl_key: Option<&str>) -> Result<Option<CrawlInfo>> {
        let row = match crawl_key {
            Some(key) => {
                keys::validate_id(key)?;
                self.get_row(Table::Crawls, key)?
            }
            None => {
                let request = ScanRequest::new(Table::Crawls.name(), KeyRange::full())
                    .descending()
                    .limit(1);
                self.get_rows(request)?.into_iter().next()
            }
        };
        row.as_ref().map(CrawlInfo::from_row).transpose()
    }

    /// Every recorded change of a node, oldest crawl first
    pub fn get_node_history(&self, pubkey: &str) -> Result<Vec<NodeHistoryEntry>> {
        let request = ScanRequest::new(Table::Nodes.name(), KeyRange::node_history(pubkey)?);
        self.get_rows(request)?
            .iter()
            .map(NodeHistoryEntry::from_row)
            .collect()
    }

    pub fn get_node_state(&self, pubkey: &str) -> Result<Option<NodeState>> {
        keys::validate_id(pubkey)?;
        self.get_row(Table::NodeState, pubkey)?
            .as_ref()
            .map(NodeState::from_row)
            .transpose()
    }

    /// Stats of every node in one crawl, ordered by pubkey
    pub fn get_crawl_node_stats(&self, crawl_key: &str) -> Result<Vec<NodeStats>> {
        let request = ScanRequest::new(Table::CrawlNodeStats.name(), KeyRange::crawl(crawl_key)?);
        self.get_rows(request)?
            .iter()
            .map(NodeStats::from_row)
            .collect()
    }

    /// Edges of one node in one crawl
    ///
    /// `Out` is a key-range scan over `crawl!pubkey!`. `In` cannot be
    /// expressed as a key range (edges are keyed by source), so it scans the
    /// whole crawl with a `cn:to = pubkey` filter: O(edges in crawl).
    pub fn get_connections(
        &self,
        crawl_key: &str,
        pubkey: &str,
        direction: Direction,
    ) -> Result<Vec<ConnectionEdge>> {
        let request = match direction {
            Direction::Out => {
                ScanRequest::new(Table::Connections.name(), KeyRange::outbound(crawl_key, pubkey)?)
            }
            Direction::In => {
                keys::validate_id(pubkey)?;
                let filter = self.store.build_single_column_value_filters(&[
                    ColumnValueFilter::equals(Table::Connections.family(), "to", pubkey),
                ]);
                debug!(crawl = crawl_key, pubkey, "inbound edges need a filtered crawl scan");
                ScanRequest::new(Table::Connections.name(), KeyRange::crawl(crawl_key)?).filter(filter)
            }
        };
        self.get_rows(request)?
            .iter()
            .map(ConnectionEdge::from_row)
            .collect()
    }

    /// Every edge of one crawl, ordered by (from, to)
    pub fn get_all_connections(&self, crawl_key: &str) -> Result<Vec<ConnectionEdge>> {
        let request = ScanRequest::new(Table::Connections.name(), KeyRange::crawl(crawl_key)?);
        self.get_rows(request)?
            .iter()
            .map(ConnectionEdge::from_row)
            .collect()
    }
}
