//! stylesync CLI
//!
//! Replays recorded host traffic against a style injector and prints what
//! the injector sends back, which dark/light transitions it reports, and
//! the style block it ends up rendering.

mod replay;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use stylesync_core::StyleSyncConfig;
use tracing_subscriber::EnvFilter;

use crate::replay::{parse_script, replay, ReplayOptions};

#[derive(Parser)]
#[command(name = "stylesync")]
#[command(about = "Drive a stylesync style injector from recorded host messages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to stylesync.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines script of host messages
    Replay {
        /// Script file, one envelope or ambient change per line
        script: PathBuf,

        /// Hint sent with the initial style request
        #[arg(long)]
        expecting_dark: bool,

        /// Initial ambient base theme (e.g. vscode-dark)
        #[arg(long)]
        ambient: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            script,
            expecting_dark,
            ambient,
        } => {
            let text = fs::read_to_string(&script)
                .with_context(|| format!("Failed to read {}", script.display()))?;
            let steps = parse_script(&text)
                .with_context(|| format!("Failed to parse {}", script.display()))?;
            tracing::info!("replaying {} steps from {}", steps.len(), script.display());

            let transcript = replay(
                &steps,
                ReplayOptions {
                    config,
                    expecting_dark,
                    ambient,
                },
            )?;
            print!("{transcript}");
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<StyleSyncConfig> {
    match path {
        Some(path) => StyleSyncConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(StyleSyncConfig::default()),
    }
}
