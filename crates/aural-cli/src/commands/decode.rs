//! Decode a binary graph and print it as JSON.

use std::path::PathBuf;

use anyhow::Context;
use aural_config::EngineConfig;
use aural_graph::decode_graph_with_rate;
use clap::Args;

/// Decode an encoded graph.
#[derive(Args)]
pub struct DecodeArgs {
    /// Encoded graph file
    pub file: PathBuf,
}

/// Run the decode command.
pub fn run(args: DecodeArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read '{}'", args.file.display()))?;
    let (graph, sample_rate) = decode_graph_with_rate(&bytes, &config.limits)
        .with_context(|| format!("failed to decode '{}'", args.file.display()))?;

    tracing::info!(sample_rate, nodes = graph.node_count(), "decoded graph");
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}
