//! Peer index
//!
//! Per-crawl pubkey → neighbour sets, built once from the edge list.

use std::collections::{BTreeMap, BTreeSet};
use serde_json::Value;
use crate::error::Result;
use crate::keys::parse_connection_pair;

/// Inbound and outbound neighbours of every node that has any edge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerIndex {
    /// pubkey → peers with an edge into it
    pub incoming: BTreeMap<String, BTreeSet<String>>,
    /// pubkey → peers it has an edge to
    pub outgoing: BTreeMap<String, BTreeSet<String>>,
}

impl PeerIndex {
    pub fn incoming(&self, pubkey: &str) -> Option<&BTreeSet<String>> {
        self.incoming.get(pubkey)
    }

    pub fn outgoing(&self, pubkey: &str) -> Option<&BTreeSet<String>> {
        self.outgoing.get(pubkey)
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }
}

/// Index the `"from,to"` keys of a crawl's connection map
///
/// `None` (no prior crawl) and an empty map both give an empty index.
pub fn derive_peer_index(connections: Option<&BTreeMap<String, Value>>) -> Result<PeerIndex> {
    let mut index = PeerIndex::default();
    let Some(connections) = connections else {
        return Ok(index);
    };

    for pair in connections.keys() {
        let (from, to) = parse_connection_pair(pair)?;
        index
            .outgoing
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        index
            .incoming
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
    }
    Ok(index)
}
