//! # Optica CLI Entry Point
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize tracing (RUST_LOG, default info,optica=debug)            │
//! │  3. Load ApiConfig: file ──► OPTICA_* env ──► --api-url flag            │
//! │  4. Build AppState (HttpTransport + TracingNotifier)                    │
//! │  5. Load the collections the command needs                              │
//! │  6. Run the command, print the result                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod args;
mod commands;
mod output;

use anyhow::Context;
use clap::Parser;
use optica_store::{ApiConfig, AppState, TracingNotifier};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ApiConfig::load(cli.config.clone()).context("loading configuration")?;
    if let Some(url) = &cli.api_url {
        config.server.url = Some(url.clone());
        config.validate().context("checking --api-url")?;
    }

    let state = AppState::from_config(config, Arc::new(TracingNotifier))
        .context("building the API client")?;
    info!("Optica CLI ready");

    commands::run(&state, cli.command, cli.json).await
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=optica=trace` - Show trace for optica crates only
/// - Default: INFO, or DEBUG with `--verbose`
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "debug,reqwest=info"
    } else {
        "info,optica=debug,reqwest=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
