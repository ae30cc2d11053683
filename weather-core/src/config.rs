use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::provider::{
    DEFAULT_MODEL, DEFAULT_PAST_DAYS, DEFAULT_TIMEZONE, ForecastOverrides, open_meteo::DEFAULT_ENDPOINT,
};

/// Forecast request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub endpoint: String,
    pub model: String,
    pub timezone: String,
    pub past_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_days: Option<u32>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            past_days: DEFAULT_PAST_DAYS,
            forecast_days: None,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Place dataset: a file path or an http(s) URL.
    ///
    /// Example TOML:
    /// dataset = "/usr/share/weather/geo_data.csv"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Directory holding the remembered locations. Defaults to the platform
    /// data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Example TOML:
    /// [forecast]
    /// model = "icon_global"
    /// timezone = "Asia/Shanghai"
    pub forecast: ForecastConfig,
}

impl Config {
    /// Return the configured dataset location.
    pub fn dataset(&self) -> Result<&str> {
        self.dataset.as_deref().ok_or_else(|| {
            anyhow!(
                "No place dataset configured.\n\
                 Hint: run `weather configure` and enter the path of the place CSV."
            )
        })
    }

    /// Request overrides derived from the forecast settings.
    pub fn forecast_overrides(&self) -> ForecastOverrides {
        ForecastOverrides {
            models: Some(self.forecast.model.clone()),
            timezone: Some(self.forecast.timezone.clone()),
            past_days: Some(self.forecast.past_days),
            forecast_days: self.forecast.forecast_days,
            ..ForecastOverrides::default()
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for the remembered locations.
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
