//! Serde adapter storing the node map as a list of `{ id, node }` entries.
//!
//! TOML tables only allow string keys, so the map is written as an array of
//! tables; JSON files use the same shape.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::node::NodeId;
use crate::nodes::GraphNodeDescription;

#[derive(Serialize)]
struct EntryRef<'a> {
    id: NodeId,
    #[serde(flatten)]
    node: &'a GraphNodeDescription,
}

#[derive(Deserialize)]
struct Entry {
    id: NodeId,
    #[serde(flatten)]
    node: GraphNodeDescription,
}

pub(crate) fn serialize<S: Serializer>(
    nodes: &BTreeMap<NodeId, GraphNodeDescription>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(nodes.iter().map(|(&id, node)| EntryRef { id, node }))
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<NodeId, GraphNodeDescription>, D::Error> {
    let entries = Vec::<Entry>::deserialize(deserializer)?;
    let mut nodes = BTreeMap::new();
    for Entry { id, node } in entries {
        if nodes.insert(id, node).is_some() {
            return Err(D::Error::custom(format!("duplicate node id {}", id.value())));
        }
    }
    Ok(nodes)
}
