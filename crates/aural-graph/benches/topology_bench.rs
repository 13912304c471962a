//! Criterion benchmarks for the graph compiler.
//!
//! Measures control-side costs only:
//!
//! - **Build**: node table plus topology for chains and feedback networks
//! - **Classify**: diffing two snapshots of the same graph
//! - **Codec**: whole-graph encode and decode
//!
//! Run with: `cargo bench -p aural-graph -- topology/`
#![allow(missing_docs)]

use std::sync::Arc;

use aural_graph::nodes::{Delay, Destination, Gain, Oscillator};
use aural_graph::{
    CompileLimits, GraphDescription, GraphNodeDescription, InertNodeFactory, NodeId, NodeTable,
    TopologyBuilder, classify_update, decode_graph, encode_graph,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const QUANTUM: usize = 128;
const SIZES: &[usize] = &[8, 64, 512];

/// Oscillator into a chain of `n` gains into the destination.
fn chain(n: usize) -> GraphDescription {
    let out = NodeId::new(0);
    let mut graph = GraphDescription::new(out)
        .with_node(out, GraphNodeDescription::Destination(Destination::default()))
        .with_node(NodeId::new(1), GraphNodeDescription::Oscillator(Oscillator::default()));
    for i in 0..n as u64 {
        let id = NodeId::new(i + 2);
        graph = graph
            .with_node(id, GraphNodeDescription::Gain(Gain::default()))
            .connect(NodeId::new(i + 1), id);
    }
    graph.connect(NodeId::new(n as u64 + 1), out)
}

/// `n` gain/delay feedback loops hanging off one chain.
fn feedback(n: usize) -> GraphDescription {
    let mut graph = chain(n);
    for i in 0..n as u64 {
        let gain = NodeId::new(i + 2);
        let delay = NodeId::new(10_000 + i);
        graph = graph
            .with_node(delay, GraphNodeDescription::Delay(Delay::default()))
            .connect(gain, delay)
            .connect(delay, gain);
    }
    graph
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology/build");
    let limits = CompileLimits::default();

    for &size in SIZES {
        let graph = chain(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &graph, |b, graph| {
            b.iter(|| {
                let table = Arc::new(NodeTable::build(graph, &InertNodeFactory, QUANTUM));
                black_box(TopologyBuilder::build(&table, graph, &limits, QUANTUM));
            });
        });

        let graph = feedback(size);
        let table = Arc::new(NodeTable::build(&graph, &InertNodeFactory, QUANTUM));
        group.bench_with_input(BenchmarkId::new("feedback_reuse_table", size), &graph, |b, graph| {
            b.iter(|| black_box(TopologyBuilder::build(&table, graph, &limits, QUANTUM)));
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology/classify");

    for &size in SIZES {
        let old = feedback(size);
        let rewired = old.clone().connect(NodeId::new(1), NodeId::new(0));
        group.bench_with_input(BenchmarkId::new("identical", size), &old, |b, old| {
            b.iter(|| black_box(classify_update(old, old)));
        });
        group.bench_with_input(BenchmarkId::new("rewired", size), &rewired, |b, new| {
            b.iter(|| black_box(classify_update(&old, new)));
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology/codec");
    let limits = CompileLimits::default();

    for &size in SIZES {
        let graph = feedback(size);
        let bytes = encode_graph(&graph, 48_000.0).unwrap();
        group.bench_with_input(BenchmarkId::new("encode", size), &graph, |b, graph| {
            b.iter(|| black_box(encode_graph(graph, 48_000.0).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &bytes, |b, bytes| {
            b.iter(|| black_box(decode_graph(bytes, &limits).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_classify, bench_codec);
criterion_main!(benches);
