//! Changed-node filter

use std::collections::BTreeMap;
use crate::model::NodeSnapshot;

/// Nodes of `new_nodes` that are absent from `old_nodes` or whose address or
/// version differs
pub fn compute_changed_nodes<'a>(
    new_nodes: &'a BTreeMap<String, NodeSnapshot>,
    old_nodes: Option<&BTreeMap<String, NodeSnapshot>>,
) -> BTreeMap<&'a str, &'a NodeSnapshot> {
    new_nodes
        .iter()
        .filter(|(pubkey, node)| match old_nodes.and_then(|old| old.get(*pubkey)) {
            None => true,
            Some(previous) => previous.ipp != node.ipp || previous.version != node.version,
        })
        .map(|(pubkey, node)| (pubkey.as_str(), node))
        .collect()
}
