mod commands;
mod manifest;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kumo")]
#[command(about = "Declarative resource management for the Kumo orchestrator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the resources described in a manifest
    Apply {
        /// Path to the manifest file
        #[arg(short, long)]
        file: PathBuf,
        /// Decide what would change without touching the orchestrator
        #[arg(long)]
        check: bool,
    },
    /// Collect host facts and print them as flattened JSON
    Facts {
        /// Force the primary private interface (e.g. eth0)
        #[arg(long)]
        primary_private: Option<String>,
        /// Force the secondary private interface
        #[arg(long)]
        secondary_private: Option<String>,
        /// Force the primary public interface
        #[arg(long)]
        primary_public: Option<String>,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply { file, check } => commands::apply::run(&file, check).await,
        Commands::Facts {
            primary_private,
            secondary_private,
            primary_public,
            pretty,
        } => {
            commands::facts::run(commands::facts::FactsArgs {
                primary_private,
                secondary_private,
                primary_public,
                pretty,
            })
            .await
        }
    }
}
