use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::catalog::ForecastModel;

/// Runtime options recognized by the pipeline, stored on disk as TOML.
/// Every field falls back to the reference behavior when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Model used when the caller does not pick one explicitly.
    pub model: ForecastModel,

    /// Forecast horizon requested from the provider, in days.
    pub forecast_days: u8,

    /// How long an assembled dataset pair stays fresh, in seconds.
    pub cache_ttl_secs: u64,

    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,

    /// Minimum spacing between successive location requests, in
    /// milliseconds, to stay polite toward the shared API.
    pub inter_request_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ForecastModel::Arome,
            forecast_days: 16,
            cache_ttl_secs: 3600,
            request_timeout_secs: 10,
            inter_request_delay_ms: 200,
        }
    }
}

impl Settings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_delay_ms)
    }

    /// Load settings from disk, or return the defaults if the file does
    /// not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::settings_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the settings file.
    pub fn settings_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo79", "meteo-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("settings.toml"))
    }
}
