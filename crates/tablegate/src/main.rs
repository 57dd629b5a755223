//! Tablegate - session-gated restaurant listing client
//!
//! Main entry point for the tablegate CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth, cache, restaurants, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Tablegate - session-gated restaurant listing client
#[derive(Parser)]
#[command(name = "tablegate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Backend base URL, including the /api prefix
    #[arg(long, global = true, env = "TABLEGATE_SERVER_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show whether the saved session is still active
    Status(status::StatusArgs),

    /// Exchange a Google authorization code for a session
    Login(auth::LoginArgs),

    /// End the session
    Logout(auth::LogoutArgs),

    /// List restaurants (requires an active session)
    Restaurants(restaurants::RestaurantsArgs),

    /// Show one restaurant from the last listing
    Show(restaurants::ShowArgs),

    /// Inspect or clear the dataset cache
    Cache(cache::CacheArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = tablegate_config::data_dir().unwrap_or_else(|| PathBuf::from(".tablegate"));

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "tablegate=debug,tablegate_core=debug,tablegate_client=debug,tablegate_cache=debug,tablegate_config=debug,info"
    } else {
        "tablegate=info,tablegate_core=warn,tablegate_cache=warn,tablegate_config=warn,warn"
    };

    let file_appender = tracing_appender::rolling::daily(data_dir.join("logs"), "tablegate.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "tablegate=trace,tablegate_core=trace,tablegate_client=trace,tablegate_cache=trace,tablegate_config=trace,info",
                )),
        )
        .init();

    let loaded = tablegate_config::load_config(None)?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::debug!(sources = ?loaded.loaded_from(), "Configuration loaded");

    let ctx = commands::Context {
        server_url: cli.server,
        json_output: cli.json,
        verbose: cli.verbose,
        config: loaded.config,
        data_dir,
    };

    match cli.command {
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Login(args) => auth::login(args, &ctx).await,
        Commands::Logout(args) => auth::logout(args, &ctx).await,
        Commands::Restaurants(args) => restaurants::list(args, &ctx).await,
        Commands::Show(args) => restaurants::show(args, &ctx).await,
        Commands::Cache(args) => cache::run(args, &ctx).await,
    }
}
