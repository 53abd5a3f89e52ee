// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photo_filter::FilterKind;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photo-filter")]
#[command(about = "Check camera access and apply sepia or mono filters to photos")]
#[command(version = photo_filter::constants::app_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current camera authorization state
    Status,

    /// Ask for camera access if it has not been decided yet
    Request,

    /// List available filters
    Filters,

    /// Apply a filter to an image file
    Apply {
        /// Input image
        input: PathBuf,

        /// Filter to apply (default from config)
        #[arg(short, long, value_parser = cli::parse_filter)]
        filter: Option<FilterKind>,

        /// Output file path (default: ~/Pictures/photo-filter/FILTER_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the current settings to the config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photo_filter=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = photo_filter::Config::load();

    let result = match cli.command {
        Commands::Status => cli::show_status(&config),
        Commands::Request => cli::request_access(&config).await,
        Commands::Filters => cli::list_filters(&config),
        Commands::Apply {
            input,
            filter,
            output,
        } => cli::apply_filter(&config, input, filter, output).await,
        Commands::InitConfig { force } => cli::init_config(&config, force),
    };

    result?;
    Ok(())
}
