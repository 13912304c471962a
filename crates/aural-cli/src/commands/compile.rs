//! Compile a graph file and print its processing plan.

use std::path::PathBuf;

use aural_config::EngineConfig;
use aural_graph::{GraphController, ProcessingNode, ProcessingNodeKind};
use clap::Args;

use super::common::read_graph;

/// Compile a graph description.
#[derive(Args)]
pub struct CompileArgs {
    /// Graph file (.json, otherwise TOML)
    pub graph: PathBuf,
}

/// Run the compile command.
pub fn run(args: CompileArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let graph = read_graph(&args.graph)?;
    let described = graph.node_count();
    let (_controller, executor) = GraphController::with_inert_nodes(graph, config.render_settings());
    let topology = executor.topology();

    println!("Graph:       {}", args.graph.display());
    println!(
        "Nodes:       {described} described, {} processing",
        topology.len()
    );
    if topology.is_empty() {
        println!("Destination: none");
    } else {
        let destination = topology.node(topology.destination_index());
        println!(
            "Destination: {} (index {})",
            destination.node_id,
            topology.destination_index()
        );
    }

    println!();
    println!("Processing order:");
    for (position, &index) in topology.processing_order().iter().enumerate() {
        println!("  {position:>4}  {}", describe(topology.node(index)));
    }

    let split: Vec<String> = topology
        .nodes()
        .iter()
        .filter(|node| node.kind == ProcessingNodeKind::DelayWriter)
        .map(|node| node.node_id.to_string())
        .collect();
    println!();
    if split.is_empty() {
        println!("Split delays: none");
    } else {
        println!("Split delays: {}", split.join(", "));
    }

    if topology.muted_nodes().is_empty() {
        println!("Muted nodes:  none");
    } else {
        println!("Muted nodes:");
        for muted in topology.muted_nodes() {
            println!("  {} {}{}", muted.node_id, muted.node_kind, role_suffix(muted.kind));
        }
    }

    Ok(())
}

fn describe(node: &ProcessingNode) -> String {
    format!(
        "{} {}{} ({} ch)",
        node.node_id,
        node.node_kind,
        role_suffix(node.kind),
        node.mixing.channel_count
    )
}

fn role_suffix(kind: ProcessingNodeKind) -> &'static str {
    match kind {
        ProcessingNodeKind::Real => "",
        ProcessingNodeKind::DelayWriter => " [writer]",
        ProcessingNodeKind::DelayReader => " [reader]",
    }
}
