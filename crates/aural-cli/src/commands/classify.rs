//! Classify the edit between two graph snapshots.

use std::path::PathBuf;

use aural_graph::classify_update;
use clap::Args;

use super::common::read_graph;

/// Compare two graph files.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Graph before the edit
    pub old: PathBuf,

    /// Graph after the edit
    pub new: PathBuf,
}

/// Run the classify command.
pub fn run(args: ClassifyArgs) -> anyhow::Result<()> {
    let old = read_graph(&args.old)?;
    let new = read_graph(&args.new)?;

    println!("{}", classify_update(&old, &new));
    Ok(())
}
