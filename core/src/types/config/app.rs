use super::retention::{RetentionPreset, RetentionSetting};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// User-facing application configuration, persisted as config.toml.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub tray: RetentionSetting,
    #[serde(default)]
    pub clipboard: RetentionSetting,
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Returns the config file path within the given data directory.
    pub fn path(data_dir: &Path) -> std::path::PathBuf {
        data_dir.join("config.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, AppConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), AppConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    ///
    /// A zero custom retention is reported here but is never treated as
    /// "expire everything" by the sweep; see `RetentionSetting::effective_expiry`.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.tray.preset == RetentionPreset::Custom && self.tray.custom_value == 0 {
            errors.push("tray custom retention must be at least 1".to_string());
        }

        if self.clipboard.preset == RetentionPreset::Custom && self.clipboard.custom_value == 0 {
            errors.push("clipboard custom retention must be at least 1".to_string());
        }

        if self.sweep.interval_minutes == 0 {
            errors.push("sweep interval_minutes must be at least 1".to_string());
        }

        errors
    }
}

/// Sweep throttling settings. The sweep itself is invoked by the embedding
/// app; this only bounds how often `should_sweep` answers yes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_interval_minutes")]
    pub interval_minutes: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_sweep_interval_minutes(),
        }
    }
}

fn default_sweep_interval_minutes() -> u32 {
    15
}

/// Errors that can occur when loading or saving config.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
