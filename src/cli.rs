// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Checking and requesting camera access
//! - Listing filters
//! - Filtering image files
//! - Writing the config file

use photo_filter::storage::{load_bitmap, output_file_name, save_bitmap};
use photo_filter::{
    AccessDecision, AppError, AppResult, Config, EditSession, FilterEngine, FilterKind,
    PermissionGate,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// clap value parser for `--filter`
pub fn parse_filter(value: &str) -> Result<FilterKind, String> {
    value.parse()
}

/// Print the current camera authorization state
pub fn show_status(config: &Config) -> AppResult<()> {
    let gate = PermissionGate::new(config.authority());
    let state = gate.check_authorization();

    println!("Camera access: {}", state);
    if state.is_terminal_refusal() {
        println!("Camera access is required to take photos. Enable it in your system privacy settings.");
    }

    Ok(())
}

/// Prompt for camera access when undetermined and print the outcome
pub async fn request_access(config: &Config) -> AppResult<()> {
    let gate = PermissionGate::new(config.authority());

    match gate.ensure_access().await {
        AccessDecision::Granted => println!("Camera access granted."),
        AccessDecision::Declined => println!("Camera access was declined."),
        AccessDecision::NeedsSettings(state) => {
            println!("Camera access is {}.", state);
            println!("Camera access is required to take photos. Enable it in your system privacy settings.");
        }
    }

    Ok(())
}

/// List filters and whether the render backend provides them
pub fn list_filters(config: &Config) -> AppResult<()> {
    let engine = FilterEngine::new(config.render_backend());

    println!("Available filters:");
    println!();
    for kind in FilterKind::ALL {
        let marker = if kind == config.default_filter {
            " (default)"
        } else {
            ""
        };
        let status = if engine.is_available(kind) {
            ""
        } else {
            " [unavailable]"
        };
        println!(
            "  {:<6} {}{}{}",
            kind.as_str(),
            kind.transform(),
            marker,
            status
        );
    }

    Ok(())
}

/// Load an image, filter it and save the result
pub async fn apply_filter(
    config: &Config,
    input: PathBuf,
    filter: Option<FilterKind>,
    output: Option<PathBuf>,
) -> AppResult<()> {
    let filter = filter.unwrap_or(config.default_filter);
    let engine = Arc::new(FilterEngine::new(config.render_backend()));
    let mut session = EditSession::new(engine);

    let bitmap = tokio::task::spawn_blocking(move || load_bitmap(&input))
        .await
        .map_err(|e| AppError::Other(format!("Load task error: {}", e)))??;
    println!(
        "Loaded {}x{} image (orientation {:?})",
        bitmap.width, bitmap.height, bitmap.orientation
    );
    session.load(bitmap);

    let filtered = session.apply_filter_async(filter).await?.clone();

    let output_path = output.unwrap_or_else(|| config.output_dir().join(output_file_name(filter)));
    info!(path = %output_path.display(), %filter, "Saving filtered photo");

    let save_path = output_path.clone();
    tokio::task::spawn_blocking(move || save_bitmap(&filtered, &save_path))
        .await
        .map_err(|e| AppError::Other(format!("Save task error: {}", e)))??;

    println!("Saved {} photo to {}", filter, output_path.display());
    Ok(())
}

/// Write `config` to the per-user config file
///
/// An existing file is left alone unless `force` is set.
pub fn init_config(config: &Config, force: bool) -> AppResult<()> {
    if !force && let Some(path) = Config::path().filter(|path| path.exists()) {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    let path = config.save()?;
    info!(path = %path.display(), "Config written");
    println!("Wrote config to {}", path.display());
    Ok(())
}
