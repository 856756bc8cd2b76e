//! EthClip - User settings module
//!
//! Read-only user configuration. The file is optional and never written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::address::NormalizationMode;

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "ETHCLIP_SETTINGS";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Clipboard polling interval (milliseconds)
    pub poll_interval_ms: u64,
    /// Sleep after a clipboard error (milliseconds)
    pub error_backoff_ms: u64,
    /// Mode at startup
    pub initial_mode: NormalizationMode,
    /// Play a sound when the mode changes
    pub sound_enabled: bool,
    /// Global shortcut toggling the mode
    pub shortcut: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            error_backoff_ms: 1000,
            initial_mode: NormalizationMode::Lowercase,
            sound_enabled: true,
            shortcut: "CmdOrCtrl+Shift+0".to_string(),
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("ethclip").join("settings.json"))
    }

    /// Read settings from `path`; `Ok(None)` when the file does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(Some(settings))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".to_string()));
        }
        if self.error_backoff_ms == 0 {
            return Err(ConfigError::Invalid("error_backoff_ms must be positive".to_string()));
        }
        if self.shortcut.trim().is_empty() {
            return Err(ConfigError::Invalid("shortcut must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            log::info!("[Settings] No config directory, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(Some(settings)) => {
                log::info!("[Settings] Loaded settings from {:?}", path);
                settings
            }
            Ok(None) => {
                log::debug!("[Settings] No settings file at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("[Settings] Ignoring {:?}: {}; using defaults", path, e);
                Self::default()
            }
        }
    }
}
