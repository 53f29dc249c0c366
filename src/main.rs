mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quicknote::config::QuicknoteConfig;

#[derive(Parser)]
#[command(name = "quicknote", version, about = "Note summarization and persistence service")]
struct Cli {
    /// Config file (default: ~/.quicknote/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP service
    Serve,
    /// Show note statistics
    Stats {
        /// Number of most-used tags to show
        #[arg(long, default_value_t = 10)]
        tags: usize,
    },
    /// Check database health
    Doctor,
    /// Export all notes as JSON to stdout
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => QuicknoteConfig::load_from(path)?,
        None => QuicknoteConfig::load()?,
    };

    // Log to stderr so `export` output on stdout stays clean JSON.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => quicknote::server::serve(config).await?,
        Command::Stats { tags } => cli::stats::stats(&config, tags)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Export => cli::export::export(&config)?,
    }

    Ok(())
}
