use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Unit;

/// Top-level configuration stored on disk.
///
/// The API key is an opaque credential: it is sent as a query parameter and
/// must never be logged, rendered, or embedded in error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Default measurement system for fetches.
    pub units: Unit,

    /// When set, forecast fetch failures are only diagnostic-logged instead
    /// of being surfaced to the user. Current-weather failures are always
    /// user-visible.
    pub suppress_forecast_errors: bool,

    /// Whether the location lookup capability is available at all.
    pub geolocation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Unit::Metric,
            suppress_forecast_errors: false,
            geolocation: true,
        }
    }
}

impl Config {
    /// Return the configured API key or a hint-bearing error.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `dashboard configure` and enter your OpenWeather API key."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
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
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `dashboard configure`"));
    }

    #[test]
    fn empty_api_key_counts_as_unset() {
        let cfg = Config { api_key: Some(String::new()), ..Config::default() };
        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn set_api_key_is_readable_back() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        assert_eq!(cfg.api_key().expect("key must exist"), "KEY");
    }

    #[test]
    fn defaults_are_metric_and_visible_errors() {
        let cfg = Config::default();
        assert_eq!(cfg.units, Unit::Metric);
        assert!(!cfg.suppress_forecast_errors);
        assert!(cfg.geolocation);
    }

    #[test]
    fn toml_roundtrip_preserves_fields() {
        let cfg = Config {
            api_key: Some("SECRET".to_string()),
            units: Unit::Imperial,
            suppress_forecast_errors: true,
            geolocation: false,
        };

        let toml = toml::to_string_pretty(&cfg).expect("serialize");
        let back: Config = toml::from_str(&toml).expect("parse");

        assert_eq!(back.api_key.as_deref(), Some("SECRET"));
        assert_eq!(back.units, Unit::Imperial);
        assert!(back.suppress_forecast_errors);
        assert!(!back.geolocation);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let back: Config = toml::from_str("api_key = \"KEY\"").expect("parse");
        assert_eq!(back.api_key.as_deref(), Some("KEY"));
        assert_eq!(back.units, Unit::Metric);
        assert!(back.geolocation);
    }
}
