//! Declarative graph snapshots.
//!
//! A [`GraphDescription`] is what the control side edits. It is never patched
//! in place once handed to the compiler: every edit is a whole new snapshot,
//! and [`classify_update`](crate::classify_update) works out what changed.

use std::collections::BTreeMap;

use crate::automation::GraphParamAutomation;
use crate::edge::{GraphConnection, GraphParamConnection};
use crate::node::NodeId;
use crate::nodes::GraphNodeDescription;

/// Snapshot of the desired audio graph.
///
/// Connections and automations may reference IDs that are not in `nodes`;
/// the builder drops them.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphDescription {
    /// Node to render into.
    pub destination: NodeId,
    /// Nodes by ID.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_nodes"))]
    pub nodes: BTreeMap<NodeId, GraphNodeDescription>,
    /// Audio connections, in author order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub connections: Vec<GraphConnection>,
    /// Parameter connections, in author order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub param_connections: Vec<GraphParamConnection>,
    /// Automation timelines.
    #[cfg_attr(feature = "serde", serde(default))]
    pub param_automations: Vec<GraphParamAutomation>,
}

impl GraphDescription {
    /// Creates an empty description rendering into `destination`.
    pub fn new(destination: NodeId) -> Self {
        Self {
            destination,
            ..Self::default()
        }
    }

    /// Inserts or replaces a node.
    pub fn with_node(mut self, id: NodeId, node: GraphNodeDescription) -> Self {
        self.nodes.insert(id, node);
        self
    }

    /// Connects output 0 of `source` to input 0 of `destination`.
    pub fn connect(self, source: NodeId, destination: NodeId) -> Self {
        self.with_connection(GraphConnection::new(source, destination))
    }

    /// Appends an audio connection.
    pub fn with_connection(mut self, connection: GraphConnection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Connects output 0 of `source` to parameter `param` of `destination`.
    pub fn connect_param(self, source: NodeId, destination: NodeId, param: usize) -> Self {
        self.with_param_connection(GraphParamConnection::new(source, destination, param))
    }

    /// Appends a parameter connection.
    pub fn with_param_connection(mut self, connection: GraphParamConnection) -> Self {
        self.param_connections.push(connection);
        self
    }

    /// Appends an automation timeline.
    pub fn with_automation(mut self, automation: GraphParamAutomation) -> Self {
        self.param_automations.push(automation);
        self
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&GraphNodeDescription> {
        self.nodes.get(&id)
    }

    /// Iterates the automations targeting `id`.
    pub fn automations_for(&self, id: NodeId) -> impl Iterator<Item = &GraphParamAutomation> {
        self.param_automations
            .iter()
            .filter(move |automation| automation.destination == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Destination, Gain};

    #[test]
    fn test_builder() {
        let a = NodeId::new(1);
        let out = NodeId::new(2);
        let graph = GraphDescription::new(out)
            .with_node(a, GraphNodeDescription::Gain(Gain::default()))
            .with_node(out, GraphNodeDescription::Destination(Destination::default()))
            .connect(a, out)
            .connect_param(a, a, 0)
            .with_automation(GraphParamAutomation::new(a, 0, 0.5))
            .with_automation(GraphParamAutomation::new(out, 0, 0.5));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.connections, vec![GraphConnection::new(a, out)]);
        assert_eq!(graph.param_connections[0].destination_param, 0);
        assert_eq!(graph.automations_for(a).count(), 1);
        assert!(graph.node(NodeId::new(7)).is_none());
    }

    #[test]
    fn test_with_node_replaces() {
        let a = NodeId::new(1);
        let graph = GraphDescription::new(a)
            .with_node(a, GraphNodeDescription::Gain(Gain::default()))
            .with_node(a, GraphNodeDescription::Destination(Destination::default()));
        assert_eq!(graph.node_count(), 1);
        assert!(matches!(graph.node(a), Some(GraphNodeDescription::Destination(_))));
    }
}
