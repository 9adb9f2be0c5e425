//! EcoSight Augment CLI
//!
//! Command-line interface for the audio augmentation engine.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecosight_augment::cli::commands;
use ecosight_augment::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "ecosight_augment=debug,augment_cli=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("EcoSight Augment v{}", env!("CARGO_PKG_VERSION"));

    commands::handle_command(cli)
}
