//! Encode a graph file into the binary wire format.

use std::path::PathBuf;

use anyhow::Context;
use aural_config::EngineConfig;
use aural_graph::encode_graph;
use clap::Args;

use super::common::read_graph;

/// Encode a graph description.
#[derive(Args)]
pub struct EncodeArgs {
    /// Graph file (.json, otherwise TOML)
    pub graph: PathBuf,

    /// Output file for the encoded graph
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Run the encode command.
pub fn run(args: EncodeArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let graph = read_graph(&args.graph)?;
    let bytes = encode_graph(&graph, config.render_settings().sample_rate)
        .with_context(|| format!("failed to encode '{}'", args.graph.display()))?;

    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    println!("Wrote {} bytes to {}", bytes.len(), args.output.display());
    Ok(())
}
