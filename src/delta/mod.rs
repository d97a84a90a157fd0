//! Delta Module
//!
//! Topology change between two consecutive processed crawls.
//!
//! ## Responsibilities
//! - Build inbound/outbound peer sets per node from the flat edge list
//! - Count peers added and dropped per node and direction
//! - Pick out nodes that are new or whose address/version changed
//!
//! Pure computation: nothing here touches the store. The previous crawl is
//! optional everywhere; a missing one behaves like an empty crawl.

mod changed;
mod peers;
mod stats;

use std::collections::BTreeMap;
use crate::error::Result;
use crate::model::{NodeSnapshot, NodeStats, ProcessedCrawl};

pub use changed::compute_changed_nodes;
pub use peers::{derive_peer_index, PeerIndex};
pub use stats::compute_node_stats;

/// Everything the repository derives from a (new, old) crawl pair
#[derive(Debug, Clone)]
pub struct CrawlDelta<'a> {
    /// Nodes that get a history row this crawl
    pub changed_nodes: BTreeMap<&'a str, &'a NodeSnapshot>,

    /// One entry per node of the new crawl
    pub node_stats: BTreeMap<String, NodeStats>,
}

impl<'a> CrawlDelta<'a> {
    pub fn compute(new: &'a ProcessedCrawl, old: Option<&ProcessedCrawl>) -> Result<Self> {
        Ok(Self {
            changed_nodes: compute_changed_nodes(&new.nodes, old.map(|o| &o.nodes)),
            node_stats: compute_node_stats(new, old)?,
        })
    }
}
