// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Directory name under the user's config directory
pub const APP_DIR_NAME: &str = "photo-filter";

/// Config file name inside [`APP_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Current config schema version
pub const CONFIG_VERSION: u32 = 1;

/// Folder under the pictures directory for filtered photos
pub const DEFAULT_SAVE_FOLDER: &str = "photo-filter";

/// Extension used when no output path is given
pub const DEFAULT_OUTPUT_EXTENSION: &str = "png";

/// Application version string (from git, see build.rs)
pub fn app_version() -> &'static str {
    env!("GIT_VERSION")
}
