use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the weatherapi.com key.
pub const WEATHER_API_KEY_ENV: &str = "CATCHLOG_WEATHER_API_KEY";
/// Environment variable holding the maps SDK key.
pub const MAPS_API_KEY_ENV: &str = "CATCHLOG_MAPS_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// # Errors
    /// Returns [`ConfigError::Invalid`] listing every error when validation failed.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self.error_summary()))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Map rendering settings
    #[serde(default)]
    pub maps: MapsConfig,

    /// GPS sampling settings
    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// weatherapi.com key. Lookups are skipped while this is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the weatherapi.com v1 API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Language for condition text (`lang=` query parameter)
    #[serde(default = "default_language")]
    pub language: Option<String>,

    /// Hour of the day whose sample provides conditions, wind direction and
    /// pressure for historical readings. Hour 0 is used when it is missing.
    #[serde(default = "default_representative_hour")]
    pub representative_hour: usize,

    /// Transport timeout for weather and geocoding requests. `None` keeps the
    /// HTTP client's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Nominatim reverse-geocoding endpoint
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com/v1".to_string()
}

fn default_language() -> Option<String> {
    Some("fr".to_string())
}

fn default_representative_hour() -> usize {
    12
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            language: default_language(),
            representative_hour: default_representative_hour(),
            request_timeout_secs: None,
            geocoder_url: default_geocoder_url(),
        }
    }
}

impl WeatherConfig {
    /// The API key, if one is configured and non-blank.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSetting`] when no usable key is present.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingSetting("weather.api_key".to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Maps SDK key, consumed by the platform map view only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Requested positioning accuracy, from coarse to navigation grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationAccuracy {
    Lowest,
    Low,
    Balanced,
    High,
    Highest,
    #[default]
    BestForNavigation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub accuracy: LocationAccuracy,

    /// Minimum time between two samples, in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Minimum distance between two samples, in meters
    #[serde(default = "default_min_distance_m")]
    pub min_distance_m: f64,
}

fn default_min_interval_ms() -> u64 {
    5000
}

fn default_min_distance_m() -> f64 {
    5.0
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            accuracy: LocationAccuracy::default(),
            min_interval_ms: default_min_interval_ms(),
            min_distance_m: default_min_distance_m(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("catchlog");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            maps: MapsConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing,
    /// then apply environment overrides.
    ///
    /// # Errors
    /// Fails when the config directory cannot be resolved or the file cannot
    /// be read, parsed or created.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults there if it
    /// doesn't exist yet. Environment overrides are not applied.
    ///
    /// # Errors
    /// Fails on IO or TOML errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// # Errors
    /// Returns an error if loading fails or validation reports errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        validation.ensure_valid()?;

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Override API keys from the environment. `lookup` maps a variable name
    /// to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = lookup(MAPS_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.maps.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        validate_url(&self.weather.geocoder_url, "weather.geocoder_url", &mut result);

        if self.weather.api_key().is_err() {
            result.add_warning(
                "weather.api_key",
                format!("Not set ({WEATHER_API_KEY_ENV}) - weather annotations disabled"),
            );
        }

        if self.weather.representative_hour > 23 {
            result.add_error(
                "weather.representative_hour",
                "Representative hour must be between 0 and 23",
            );
        }

        if self.weather.request_timeout_secs == Some(0) {
            result.add_error(
                "weather.request_timeout_secs",
                "Timeout must be greater than 0",
            );
        }

        if self.maps.api_key.as_deref().map_or(true, str::is_empty) {
            result.add_warning(
                "maps.api_key",
                format!("Not set ({MAPS_API_KEY_ENV}) - map tiles may not render"),
            );
        }

        if self.tracking.min_interval_ms == 0 {
            result.add_warning(
                "tracking.min_interval_ms",
                "No minimum sampling interval - the platform may flood updates",
            );
        }

        if !self.tracking.min_distance_m.is_finite() || self.tracking.min_distance_m < 0.0 {
            result.add_error(
                "tracking.min_distance_m",
                "Minimum distance must be a non-negative number",
            );
        }

        result
    }

    /// Save configuration to an explicit path
    ///
    /// # Errors
    /// Fails on IO or serialization errors.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("catchlog");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
