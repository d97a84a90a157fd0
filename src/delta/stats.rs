//! Per-node statistics
//!
//! Observed fields copied from the snapshot, plus add/drop counts per
//! direction against the previous crawl's peer index.

use std::collections::{BTreeMap, BTreeSet};
use crate::error::Result;
use crate::model::{NodeStats, ProcessedCrawl};
use super::peers::{derive_peer_index, PeerIndex};

/// Peers in `current` but not in `previous`
///
/// Sorted-set difference, linear in the sizes of both sets.
fn added(current: Option<&BTreeSet<String>>, previous: Option<&BTreeSet<String>>) -> usize {
    match (current, previous) {
        (None, _) => 0,
        (Some(current), None) => current.len(),
        (Some(current), Some(previous)) => current.difference(previous).count(),
    }
}

/// One stats entry for every node of `new`
pub fn compute_node_stats(
    new: &ProcessedCrawl,
    old: Option<&ProcessedCrawl>,
) -> Result<BTreeMap<String, NodeStats>> {
    let np = derive_peer_index(Some(&new.connections))?;
    let op = derive_peer_index(old.map(|o| &o.connections))?;

    Ok(new
        .nodes
        .iter()
        .map(|(pubkey, node)| {
            let stats = NodeStats {
                pubkey: pubkey.clone(),
                ipp: node.ipp.clone(),
                version: node.version.clone(),
                uptime: node.uptime,
                request_time: node.request_time,
                exceptions: node.errors.clone(),
                in_count: node.in_count,
                out_count: node.out_count,
                ..peer_deltas(pubkey, &np, &op)
            };
            (pubkey.clone(), stats)
        })
        .collect())
}

fn peer_deltas(pubkey: &str, np: &PeerIndex, op: &PeerIndex) -> NodeStats {
    NodeStats {
        in_add_count: added(np.incoming(pubkey), op.incoming(pubkey)),
        in_drop_count: added(op.incoming(pubkey), np.incoming(pubkey)),
        out_add_count: added(np.outgoing(pubkey), op.outgoing(pubkey)),
        out_drop_count: added(op.outgoing(pubkey), np.outgoing(pubkey)),
        ..NodeStats::default()
    }
}
