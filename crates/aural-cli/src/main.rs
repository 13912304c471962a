//! Aural CLI - inspect, compile and encode audio rendering graphs.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aural")]
#[command(author, version, about = "Audio rendering-graph compiler", long_about = None)]
struct Cli {
    /// Engine configuration file (defaults to the user config file, if any)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a graph and print its processing plan
    Compile(commands::compile::CompileArgs),

    /// Classify the edit between two graph snapshots
    Classify(commands::classify::ClassifyArgs),

    /// Encode a graph file into the binary wire format
    Encode(commands::encode::EncodeArgs),

    /// Decode a binary graph and print it as JSON
    Decode(commands::decode::DecodeArgs),

    /// Create or inspect the engine configuration file
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = commands::common::load_engine_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compile(args) => commands::compile::run(args, &config),
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Encode(args) => commands::encode::run(args, &config),
        Commands::Decode(args) => commands::decode::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
    }
}
