//! Engine configuration commands.

use aural_config::paths::CONFIG_FILE_NAME;
use aural_config::{EngineConfig, default_config_path, ensure_user_config_dir, find_config};
use clap::{Args, Subcommand};

/// Manage the engine configuration file.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a default engine.toml into the user config directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration in effect as TOML
    Show,

    /// Print the user config file path
    Path,
}

/// Run the config command.
pub fn run(args: ConfigArgs, config: &EngineConfig) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Init { force } => init(force),
        ConfigCommand::Show => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigCommand::Path => {
            let path = default_config_path();
            let state = if find_config(None).is_some() { "" } else { " (not created)" };
            println!("{}{state}", path.display());
            Ok(())
        }
    }
}

fn init(force: bool) -> anyhow::Result<()> {
    let path = ensure_user_config_dir()?.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }

    EngineConfig::default().save(&path)?;
    tracing::debug!(path = %path.display(), "wrote default engine config");
    println!("Wrote {}", path.display());
    Ok(())
}
