use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{model::Coordinates, model::UnitSystem, store::ErrorFlagPolicy};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// OpenWeather credentials and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OpenWeatherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Key taken from the environment. Never written back to disk.
    #[serde(skip)]
    pub env_api_key: Option<String>,

    /// Overrides [`DEFAULT_BASE_URL`]; mostly useful against a mock server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Where coordinates come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// Approximate position from the public IP address.
    #[default]
    Ip,
    /// Fixed `latitude`/`longitude` from this file.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocationConfig {
    #[serde(default)]
    pub mode: LocationMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpConfig {
    /// Per-request timeout; the transport default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// units = "metric"
///
/// [openweather]
/// api_key = "..."
///
/// [location]
/// mode = "fixed"
/// latitude = 52.52
/// longitude = 13.405
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub units: UnitSystem,

    /// Set both error flags on any fetch failure instead of only the one
    /// matching the failing step.
    #[serde(default)]
    pub coupled_error_flags: bool,

    #[serde(default)]
    pub openweather: OpenWeatherConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Returns the API key, or an error with a hint when none is configured.
    pub fn api_key(&self) -> Result<&str> {
        let openweather = &self.openweather;
        openweather
            .env_api_key
            .as_deref()
            .or(openweather.api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather-news configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key);
    }

    pub fn base_url(&self) -> &str {
        self.openweather.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.http.timeout_secs.map(Duration::from_secs)
    }

    pub fn error_flag_policy(&self) -> ErrorFlagPolicy {
        if self.coupled_error_flags { ErrorFlagPolicy::Coupled } else { ErrorFlagPolicy::PerSource }
    }

    /// Store fixed coordinates and switch to fixed location mode.
    pub fn set_fixed_location(&mut self, coordinates: Coordinates) {
        self.location = LocationConfig {
            mode: LocationMode::Fixed,
            latitude: Some(coordinates.latitude),
            longitude: Some(coordinates.longitude),
        };
    }

    /// Coordinates for fixed mode; `None` in IP mode.
    pub fn fixed_coordinates(&self) -> Result<Option<Coordinates>> {
        match self.location.mode {
            LocationMode::Ip => Ok(None),
            LocationMode::Fixed => match (self.location.latitude, self.location.longitude) {
                (Some(lat), Some(lon)) => Ok(Some(Coordinates::new(lat, lon))),
                _ => Err(anyhow!(
                    "Location mode is 'fixed' but latitude/longitude are missing.\n\
                     Hint: run `weather-news configure` or pass --lat/--lon."
                )),
            },
        }
    }

    /// Apply overrides from the environment, looked up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.openweather.env_api_key = Some(key);
        }
    }

    /// Load config from the platform path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-news", "weather-news")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
