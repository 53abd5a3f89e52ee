// SPDX-License-Identifier: GPL-3.0-only

//! User configuration, stored as pretty JSON under the config directory
//!
//! Every field has a default, so partial or older files still load.

use crate::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, CONFIG_VERSION};
use crate::errors::ConfigError;
use crate::filters::{CpuBackend, FilterKind, TransformId};
use crate::permission::{
    AuthorizationState, CaptureAuthority, DeviceNodeAuthority, MemoryAuthority, PortalAuthority,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where camera consent is read from
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionBackend {
    /// XDG desktop portal (works inside and outside Flatpak)
    #[default]
    Portal,
    /// File permissions on /dev/video* nodes
    DeviceNode,
    /// In-process simulation that grants on first prompt
    Simulated,
}

/// Persistent preferences: consent backend, filters and output location
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version of the stored file
    pub version: u32,
    /// Camera consent backend
    pub permission_backend: PermissionBackend,
    /// Application id used for portal permission lookups (empty for host apps)
    pub app_id: String,
    /// Filter used when none is given on the command line
    pub default_filter: FilterKind,
    /// Transforms the render backend should report as unavailable
    pub disabled_filters: Vec<TransformId>,
    /// Output directory override
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            permission_backend: PermissionBackend::default(),
            app_id: String::new(),
            default_filter: FilterKind::default(),
            disabled_filters: Vec::new(),
            output_dir: None,
        }
    }
}

impl Config {
    /// Per-user config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Read the config file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;

        if config.version > CONFIG_VERSION {
            warn!(
                found = config.version,
                supported = CONFIG_VERSION,
                "Config written by a newer version"
            );
        }

        Ok(config)
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };

        Self::load_from(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Save to the default location and return the path written
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Render backend honouring `disabled_filters`
    pub fn render_backend(&self) -> CpuBackend {
        CpuBackend::without(self.disabled_filters.iter().copied())
    }

    /// Capture authority selected by `permission_backend`
    pub fn authority(&self) -> Box<dyn CaptureAuthority> {
        match self.permission_backend {
            PermissionBackend::Portal => Box::new(PortalAuthority::new(self.app_id.clone())),
            PermissionBackend::DeviceNode => Box::new(DeviceNodeAuthority::default()),
            PermissionBackend::Simulated => {
                Box::new(MemoryAuthority::new(AuthorizationState::Undetermined))
            }
        }
    }

    /// Directory filtered photos are written to
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(crate::storage::default_output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "default_filter": "mono", "permission_backend": "device_node" }"#)
                .unwrap();
        assert_eq!(config.default_filter, FilterKind::Mono);
        assert_eq!(config.permission_backend, PermissionBackend::DeviceNode);
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.disabled_filters.is_empty());
    }

    #[test]
    fn test_disabled_filters_reach_backend() {
        let config: Config =
            serde_json::from_str(r#"{ "disabled_filters": ["sepia-tone"] }"#).unwrap();
        let backend = config.render_backend();
        assert!(!backend.supports(TransformId::SepiaTone));
        assert!(backend.supports(TransformId::PhotoEffectMono));
    }

    #[test]
    fn test_output_dir_override() {
        let config = Config {
            output_dir: Some(PathBuf::from("/tmp/filtered")),
            ..Config::default()
        };
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/filtered"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config: Config =
            serde_json::from_str(r#"{ "default_filter": "mono", "bake_orientation": true }"#)
                .unwrap();
        assert_eq!(config.default_filter, FilterKind::Mono);
    }
}
