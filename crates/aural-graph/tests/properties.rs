//! Property-based tests for the graph compiler.
//!
//! Random graphs check the ordering and wiring guarantees of compiled
//! topologies; random node values check the wire codec.

use std::sync::Arc;

use aural_graph::nodes::{Delay, Destination, Gain, Oscillator, OscillatorType, PeriodicWave};
use aural_graph::{
    CompileLimits, GraphDescription, GraphNodeDescription, InertNodeFactory, NodeId, NodeTable,
    Topology, TopologyBuilder, decode_graph, decode_node, encode_graph, encode_node,
};
use proptest::prelude::*;

fn compile(description: &GraphDescription) -> Topology {
    let table = Arc::new(NodeTable::build(description, &InertNodeFactory, 128));
    TopologyBuilder::build(&table, description, &CompileLimits::default(), 128)
}

fn order_positions(topology: &Topology) -> Vec<usize> {
    let mut positions = vec![usize::MAX; topology.len()];
    for (position, &index) in topology.processing_order().iter().enumerate() {
        positions[index] = position;
    }
    positions
}

/// Builds a graph over `ids`, mapping index pairs to nodes. Index 0 is a
/// destination; `delays` marks which other indices are delays.
fn build_graph(
    ids: &[u64],
    delays: &[bool],
    audio: &[(usize, usize)],
    params: &[(usize, usize)],
) -> GraphDescription {
    let mut graph = GraphDescription::new(NodeId::new(ids[0]));
    for (index, &id) in ids.iter().enumerate() {
        let node = if index == 0 {
            GraphNodeDescription::Destination(Destination::default())
        } else if delays[index % delays.len()] {
            GraphNodeDescription::Delay(Delay::default())
        } else {
            GraphNodeDescription::Gain(Gain::default())
        };
        graph = graph.with_node(NodeId::new(id), node);
    }
    for &(source, destination) in audio {
        graph = graph.connect(NodeId::new(ids[source]), NodeId::new(ids[destination]));
    }
    for &(source, destination) in params {
        graph = graph.connect_param(NodeId::new(ids[source]), NodeId::new(ids[destination]), 0);
    }
    graph
}

/// Distinct IDs in random order, so compiled indices do not follow edges.
fn shuffled_ids(n: usize) -> impl Strategy<Value = Vec<u64>> {
    Just((1..=n as u64).map(|i| i * 10).collect::<Vec<_>>()).prop_shuffle()
}

fn edge_list(n: usize, max: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..n, 0..n), 0..max)
}

fn periodic_wave() -> impl Strategy<Value = Option<PeriodicWave>> {
    prop::option::of(
        (
            prop::collection::vec(-1.0f32..1.0, 0..16),
            prop::collection::vec(-1.0f32..1.0, 0..16),
            any::<bool>(),
        )
            .prop_map(|(real, imag, disable_normalization)| PeriodicWave {
                real,
                imag,
                disable_normalization,
            }),
    )
}

fn oscillator() -> impl Strategy<Value = Oscillator> {
    (
        0usize..5,
        1.0f32..20_000.0,
        -1200.0f32..1200.0,
        prop::option::of(0u64..1 << 40),
        prop::option::of(0u64..1 << 40),
        periodic_wave(),
    )
        .prop_map(|(waveform, frequency, detune, start_frame, stop_frame, periodic_wave)| {
            let waveform = [
                OscillatorType::Sine,
                OscillatorType::Square,
                OscillatorType::Sawtooth,
                OscillatorType::Triangle,
                OscillatorType::Custom,
            ][waveform];
            Oscillator {
                waveform,
                frequency,
                detune,
                start_frame,
                stop_frame,
                periodic_wave,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Forward-only edges form a DAG: nothing is muted or split and every edge
    /// source is processed before its destination.
    #[test]
    fn acyclic_order_respects_edges(
        ids in shuffled_ids(12),
        audio in edge_list(12, 30),
        params in edge_list(12, 10),
    ) {
        // Orient every edge from the higher index to the lower one, ending at
        // the destination side.
        let orient = |edges: Vec<(usize, usize)>| -> Vec<(usize, usize)> {
            edges
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.max(b), a.min(b)))
                .collect()
        };
        let audio = orient(audio);
        // The destination has no parameters to connect to.
        let params: Vec<_> = orient(params).into_iter().filter(|&(_, d)| d != 0).collect();
        let graph = build_graph(&ids, &[false], &audio, &params);
        let topology = compile(&graph);

        prop_assert!(topology.muted_nodes().is_empty());
        prop_assert_eq!(topology.len(), ids.len());

        let mut order = topology.processing_order().to_vec();
        order.sort_unstable();
        prop_assert_eq!(order, (0..ids.len()).collect::<Vec<_>>());

        let positions = order_positions(&topology);
        for (source, destination) in audio.iter().chain(&params) {
            let s = topology.index_of(NodeId::new(ids[*source])).unwrap();
            let d = topology.index_of(NodeId::new(ids[*destination])).unwrap();
            prop_assert!(positions[s] < positions[d], "edge {} -> {} out of order", s, d);
        }
    }

    /// Arbitrary graphs, cycles included: every surviving wire runs forward in
    /// the processing order and `dependents` mirrors the wiring exactly.
    #[test]
    fn surviving_wiring_runs_forward(
        ids in shuffled_ids(10),
        delays in prop::collection::vec(any::<bool>(), 1..10),
        audio in edge_list(10, 25),
        params in edge_list(10, 8),
    ) {
        let graph = build_graph(&ids, &delays, &audio, &params);
        let topology = compile(&graph);
        let positions = order_positions(&topology);

        let mut expected_dependents = vec![Vec::new(); topology.len()];
        for (destination, inputs) in topology.inputs_by_input().iter().enumerate() {
            for connection in inputs.iter().flatten() {
                prop_assert!(positions[connection.source] < positions[destination]);
                expected_dependents[connection.source].push(destination);
            }
        }
        for (destination, params) in topology.params_by_param().iter().enumerate() {
            for connection in params.iter().flatten() {
                prop_assert!(positions[connection.source] < positions[destination]);
                expected_dependents[connection.source].push(destination);
            }
        }

        let mut actual: Vec<Vec<usize>> = topology.dependents().to_vec();
        for list in actual.iter_mut().chain(expected_dependents.iter_mut()) {
            list.sort_unstable();
        }
        prop_assert_eq!(actual, expected_dependents);
    }

    /// Connections naming unknown IDs never change the compiled plan.
    #[test]
    fn dangling_connections_ignored(
        ids in shuffled_ids(6),
        audio in edge_list(6, 12),
        ghosts in prop::collection::vec((1000u64..2000, 0usize..6), 1..6),
    ) {
        let base = build_graph(&ids, &[false, true], &audio, &[]);
        let mut noisy = base.clone();
        for &(ghost, index) in &ghosts {
            let real = NodeId::new(ids[index]);
            noisy = noisy
                .connect(NodeId::new(ghost), real)
                .connect(real, NodeId::new(ghost))
                .connect_param(NodeId::new(ghost), real, 0);
        }
        let expected = compile(&base);
        let actual = compile(&noisy);
        prop_assert_eq!(actual.nodes(), expected.nodes());
        prop_assert_eq!(actual.processing_order(), expected.processing_order());
        prop_assert_eq!(actual.inputs_by_input(), expected.inputs_by_input());
        prop_assert_eq!(actual.params_by_param(), expected.params_by_param());
        prop_assert_eq!(actual.dependents(), expected.dependents());
        prop_assert_eq!(actual.muted_nodes(), expected.muted_nodes());
    }

    /// Oscillator payloads survive the codec, with and without custom waves.
    #[test]
    fn oscillator_codec_roundtrip(osc in oscillator()) {
        let node = GraphNodeDescription::Oscillator(osc);
        let bytes = encode_node(&node).unwrap();
        prop_assert_eq!(decode_node(&bytes, &CompileLimits::default()).unwrap(), node);
    }

    /// Whole graphs survive the framing.
    #[test]
    fn graph_codec_roundtrip(
        ids in shuffled_ids(8),
        delays in prop::collection::vec(any::<bool>(), 1..8),
        audio in edge_list(8, 16),
        params in edge_list(8, 4),
        rate in 8_000.0f32..192_000.0,
    ) {
        let graph = build_graph(&ids, &delays, &audio, &params);
        let bytes = encode_graph(&graph, rate).unwrap();
        prop_assert_eq!(decode_graph(&bytes, &CompileLimits::default()).unwrap(), graph);
    }

    /// Decoding arbitrary bytes never panics.
    #[test]
    fn decode_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let limits = CompileLimits::default();
        let _ = decode_node(&bytes, &limits);
        let _ = decode_graph(&bytes, &limits);
    }
}
