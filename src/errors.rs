// SPDX-License-Identifier: GPL-3.0-only

//! Error types for filtering, storage and configuration

use std::fmt;
use std::path::PathBuf;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for the filter engine
pub type FilterResult<T> = Result<T, FilterError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Filter pipeline errors
    Filter(FilterError),
    /// Image load/save errors
    Storage(StorageError),
    /// Configuration errors
    Config(ConfigError),
    /// Generic error with message
    Other(String),
}

/// Errors produced while applying a filter
///
/// Both variants are recoverable: the caller keeps showing the image it had.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The render backend cannot construct the named transform
    FilterUnavailable(&'static str),
    /// Evaluating the transform produced no image
    RenderFailed(String),
}

/// Image file errors
#[derive(Debug, Clone)]
pub enum StorageError {
    /// File could not be opened or decoded
    LoadFailed { path: PathBuf, reason: String },
    /// File could not be encoded or written
    SaveFailed { path: PathBuf, reason: String },
    /// The bitmap handed to the encoder is not a valid RGBA buffer
    InvalidBitmap,
}

/// Configuration file errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Reading or writing the file failed
    Io(String),
    /// The file is not valid JSON for [`crate::config::Config`]
    Parse(String),
    /// No per-user config directory on this system
    NoConfigDir,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Filter(e) => write!(f, "Filter error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::FilterUnavailable(id) => {
                write!(f, "Filter '{}' is not available on this system", id)
            }
            FilterError::RenderFailed(msg) => write!(f, "Rendering failed: {}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::LoadFailed { path, reason } => {
                write!(f, "Failed to load {}: {}", path.display(), reason)
            }
            StorageError::SaveFailed { path, reason } => {
                write!(f, "Failed to save {}: {}", path.display(), reason)
            }
            StorageError::InvalidBitmap => write!(f, "Bitmap has no valid pixel buffer"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Invalid config file: {}", msg),
            ConfigError::NoConfigDir => write!(f, "No configuration directory available"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for FilterError {}
impl std::error::Error for StorageError {}
impl std::error::Error for ConfigError {}

// Conversions from sub-errors to AppError
impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::Filter(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
