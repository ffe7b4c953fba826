//! Shelfmark - personal bookmark archive server.
//!
//! Main entry point for the Shelfmark CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use commands::{hash_password, serve};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Shelfmark - personal bookmark archive server
#[derive(Parser)]
#[command(name = "shelfmark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the web interface for stored bookmarks
    Serve(serve::ServeArgs),

    /// Hash a password for an accounts seed file
    HashPassword(hash_password::HashPasswordArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "shelfmark=debug,shelfmark_server=debug,shelfmark_cache=debug,shelfmark_store=debug,info"
    } else {
        "shelfmark=info,shelfmark_server=info,shelfmark_cache=info,shelfmark_store=info,warn"
    };

    let log_dir = dirs::data_local_dir()
        .map(|d| d.join("shelfmark").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "shelfmark.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "shelfmark=trace,shelfmark_server=trace,shelfmark_cache=trace,shelfmark_store=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::HashPassword(args) => hash_password::run(args, &ctx),
    }
}
