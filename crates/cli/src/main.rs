//! Delphi CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write a starter config file
//! - `chat`    — Interactive chat or single-message mode over a reference corpus

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "delphi",
    about = "Delphi — retrieval-augmented chat over local reference passages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ~/.delphi/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Onboard,

    /// Chat with the model over a reference corpus
    Chat {
        /// Reference passages: a UTF-8 text file, blank-line separated
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Rank passages by embedding similarity instead of keywords
        #[arg(long)]
        vector: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run(cli.config.as_deref())?,
        Commands::Chat {
            file,
            message,
            vector,
        } => commands::chat::run(cli.config.as_deref(), file.as_deref(), message, vector).await?,
    }

    Ok(())
}
