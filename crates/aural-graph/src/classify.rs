//! Update classification.
//!
//! Given the description a live graph was compiled from and a new one,
//! [`classify_update`] picks the cheapest safe way to move the graph forward:
//!
//! | class | work |
//! |---|---|
//! | [`None`](GraphUpdateKind::None) | nothing |
//! | [`Parameter`](GraphUpdateKind::Parameter) | write parameter stores in place |
//! | [`Topology`](GraphUpdateKind::Topology) | rebuild the topology, keep the node table |
//! | [`RebuildRequired`](GraphUpdateKind::RebuildRequired) | rebuild node table and topology |
//!
//! Connection lists are compared positionally: reordering connections is a
//! topology edit even when the set is unchanged.

use crate::description::GraphDescription;
use crate::nodes::GraphNodeDescription;

/// Cost class of a graph edit, ordered cheapest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum GraphUpdateKind {
    /// Nothing changed.
    #[default]
    None,
    /// Only parameter values or automation changed.
    Parameter,
    /// Wiring or channel mixing changed; nodes can be reused.
    Topology,
    /// Node set or a node's shape changed.
    RebuildRequired,
}

impl GraphUpdateKind {
    /// Returns a short human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            GraphUpdateKind::None => "none",
            GraphUpdateKind::Parameter => "parameter",
            GraphUpdateKind::Topology => "topology",
            GraphUpdateKind::RebuildRequired => "rebuild",
        }
    }
}

impl core::fmt::Display for GraphUpdateKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulates field comparisons into the most expensive class observed.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct UpdateCheck(GraphUpdateKind);

impl UpdateCheck {
    fn raise(self, changed: bool, kind: GraphUpdateKind) -> Self {
        if changed { Self(self.0.max(kind)) } else { self }
    }

    pub(crate) fn rebuild_if(self, changed: bool) -> Self {
        self.raise(changed, GraphUpdateKind::RebuildRequired)
    }

    pub(crate) fn topology_if(self, changed: bool) -> Self {
        self.raise(changed, GraphUpdateKind::Topology)
    }

    pub(crate) fn parameter_if(self, changed: bool) -> Self {
        self.raise(changed, GraphUpdateKind::Parameter)
    }

    pub(crate) fn finish(self) -> GraphUpdateKind {
        self.0
    }
}

/// Classifies the edit from `old` to `new` for a single node.
pub fn classify_node_update(old: &GraphNodeDescription, new: &GraphNodeDescription) -> GraphUpdateKind {
    old.classify_update(new)
}

/// Classifies the edit from `old` to `new` for a whole graph.
pub fn classify_update(old: &GraphDescription, new: &GraphDescription) -> GraphUpdateKind {
    if old.destination != new.destination || old.nodes.len() != new.nodes.len() {
        return GraphUpdateKind::RebuildRequired;
    }

    let mut any_node_changed = false;
    let mut any_topology_affecting = false;
    for (id, old_node) in &old.nodes {
        let Some(new_node) = new.nodes.get(id) else {
            return GraphUpdateKind::RebuildRequired;
        };
        match classify_node_update(old_node, new_node) {
            GraphUpdateKind::None => {}
            GraphUpdateKind::Parameter => any_node_changed = true,
            GraphUpdateKind::Topology => {
                any_node_changed = true;
                any_topology_affecting = true;
            }
            GraphUpdateKind::RebuildRequired => return GraphUpdateKind::RebuildRequired,
        }
    }

    let connections_changed =
        old.connections != new.connections || old.param_connections != new.param_connections;
    if connections_changed || any_topology_affecting {
        return GraphUpdateKind::Topology;
    }

    if any_node_changed || automations_differ(old, new) {
        return GraphUpdateKind::Parameter;
    }

    GraphUpdateKind::None
}

fn automations_differ(old: &GraphDescription, new: &GraphDescription) -> bool {
    old.param_automations.len() != new.param_automations.len()
        || old
            .param_automations
            .iter()
            .zip(&new.param_automations)
            .any(|(a, b)| a.render_differs(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::{AutomationSegment, GraphParamAutomation, SegmentKind};
    use crate::edge::GraphConnection;
    use crate::node::NodeId;
    use crate::nodes::{Destination, Gain, Oscillator, OscillatorType, PeriodicWave};

    const OSC: NodeId = NodeId::new(1);
    const GAIN: NodeId = NodeId::new(2);
    const OUT: NodeId = NodeId::new(3);

    fn graph() -> GraphDescription {
        GraphDescription::new(OUT)
            .with_node(OSC, GraphNodeDescription::Oscillator(Oscillator::default()))
            .with_node(GAIN, GraphNodeDescription::Gain(Gain::default()))
            .with_node(OUT, GraphNodeDescription::Destination(Destination::default()))
            .connect(OSC, GAIN)
            .connect(GAIN, OUT)
    }

    fn with_oscillator(osc: Oscillator) -> GraphDescription {
        graph().with_node(OSC, GraphNodeDescription::Oscillator(osc))
    }

    #[test]
    fn test_ordering() {
        assert!(GraphUpdateKind::None < GraphUpdateKind::Parameter);
        assert!(GraphUpdateKind::Parameter < GraphUpdateKind::Topology);
        assert!(GraphUpdateKind::Topology < GraphUpdateKind::RebuildRequired);
    }

    #[test]
    fn test_identical_is_none() {
        assert_eq!(classify_update(&graph(), &graph()), GraphUpdateKind::None);
    }

    #[test]
    fn test_one_connection_differs_is_topology() {
        let mut new = graph();
        new.connections[1] = GraphConnection::ports(GAIN, 0, OUT, 1);
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::Topology);
    }

    #[test]
    fn test_reordered_connections_are_topology() {
        let mut new = graph();
        new.connections.reverse();
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::Topology);
    }

    #[test]
    fn test_frequency_change_is_parameter() {
        let new = with_oscillator(Oscillator {
            frequency: 220.0,
            ..Oscillator::default()
        });
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::Parameter);
    }

    #[test]
    fn test_waveform_change_is_rebuild() {
        let new = with_oscillator(Oscillator {
            waveform: OscillatorType::Triangle,
            ..Oscillator::default()
        });
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::RebuildRequired);
    }

    #[test]
    fn test_periodic_wave_appearing_is_rebuild() {
        let new = with_oscillator(Oscillator {
            periodic_wave: Some(PeriodicWave::default()),
            ..Oscillator::default()
        });
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::RebuildRequired);
        assert_eq!(classify_update(&new, &graph()), GraphUpdateKind::RebuildRequired);
    }

    #[test]
    fn test_destination_change_is_rebuild() {
        let mut new = graph();
        new.destination = GAIN;
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::RebuildRequired);
    }

    #[test]
    fn test_replaced_node_id_is_rebuild() {
        let mut new = graph();
        new.nodes.remove(&GAIN);
        new.nodes
            .insert(NodeId::new(9), GraphNodeDescription::Gain(Gain::default()));
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::RebuildRequired);
    }

    #[test]
    fn test_rebuild_wins_over_connection_change() {
        let mut new = with_oscillator(Oscillator {
            waveform: OscillatorType::Square,
            ..Oscillator::default()
        });
        new.connections.clear();
        assert_eq!(classify_update(&graph(), &new), GraphUpdateKind::RebuildRequired);
    }

    #[test]
    fn test_automation_only_is_parameter() {
        let automation = GraphParamAutomation::new(GAIN, 0, 1.0);
        let old = graph().with_automation(automation.clone());
        let new = graph().with_automation(automation.with_segment(AutomationSegment {
            kind: SegmentKind::SetTarget,
            target: 0.0,
            time_constant: 0.1,
            ..AutomationSegment::default()
        }));
        assert_eq!(classify_update(&old, &new), GraphUpdateKind::Parameter);
        assert_eq!(classify_update(&graph(), &old), GraphUpdateKind::Parameter);
    }

    #[test]
    fn test_automation_seconds_only_is_none() {
        let segment = AutomationSegment {
            kind: SegmentKind::LinearRamp,
            end_frame: 480,
            ..AutomationSegment::default()
        };
        let old = graph().with_automation(GraphParamAutomation::new(GAIN, 0, 1.0).with_segment(segment.clone()));
        let new = graph().with_automation(GraphParamAutomation::new(GAIN, 0, 1.0).with_segment(AutomationSegment {
            end_time: 0.01,
            ..segment
        }));
        assert_eq!(classify_update(&old, &new), GraphUpdateKind::None);
    }
}
