//! Configuration loading, validation, and management for AirAdvisor.
//!
//! Loads configuration from `~/.airadvisor/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! [`AppConfig`] is passed explicitly into every component that needs it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.airadvisor/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default language-model provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Upper bound on a single model call
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Profile storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Precaution rule resource
    #[serde(default)]
    pub rules: RulesConfig,

    /// Geocoding and pollution data
    #[serde(default)]
    pub air_quality: AirQualityConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_model_timeout_secs() -> u64 {
    60
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("gateway", &self.gateway)
            .field("storage", &self.storage)
            .field("rules", &self.rules)
            .field("air_quality", &self.air_quality)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl std::fmt::Debug for AirQualityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirQualityConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("geocoder", &self.geocoder)
            .field("timeout_secs", &self.timeout_secs)
            .field("fallback_coordinates", &self.fallback_coordinates)
            .field("cities", &self.cities.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file. Relative paths resolve against the config dir.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    "users.db".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// JSON rule file. Relative paths resolve against the config dir.
    #[serde(default = "default_rules_path")]
    pub path: String,

    /// Load once at startup instead of re-reading on every request
    #[serde(default)]
    pub cache: bool,
}

fn default_rules_path() -> String {
    "rules.json".into()
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: default_rules_path(),
            cache: false,
        }
    }
}

/// Which geocoder resolves city names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocoderKind {
    /// OpenWeather direct geocoding API
    Openweather,
    /// The `cities` table in this config
    Local,
    /// Skip geocoding; always use `fallback_coordinates`
    None,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AirQualityConfig {
    /// OpenWeather API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_air_quality_url")]
    pub base_url: String,

    #[serde(default = "default_geocoder")]
    pub geocoder: GeocoderKind,

    /// Upper bound on geocoding + pollution lookup together
    #[serde(default = "default_air_quality_timeout_secs")]
    pub timeout_secs: u64,

    /// Used when a city is not in the local table, or geocoding is skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_coordinates: Option<CoordinatesConfig>,

    /// City name → coordinates for the local geocoder
    #[serde(default)]
    pub cities: HashMap<String, CoordinatesConfig>,
}

fn default_air_quality_url() -> String {
    "http://api.openweathermap.org".into()
}
fn default_geocoder() -> GeocoderKind {
    GeocoderKind::Openweather
}
fn default_air_quality_timeout_secs() -> u64 {
    10
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_air_quality_url(),
            geocoder: default_geocoder(),
            timeout_secs: default_air_quality_timeout_secs(),
            fallback_coordinates: None,
            cities: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesConfig {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.airadvisor/config.toml).
    ///
    /// Also checks environment variables:
    /// - `AIRADVISOR_API_KEY`, then `GEMINI_API_KEY` for the model key
    /// - `OPENWEATHER_API_KEY` for the air-quality key
    /// - `AIRADVISOR_PROVIDER`, `AIRADVISOR_MODEL`
    /// - `PORT` for the gateway port
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (injected for tests).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("AIRADVISOR_API_KEY").or_else(|| lookup("GEMINI_API_KEY"));
        }
        if self.air_quality.api_key.is_none() {
            self.air_quality.api_key = lookup("OPENWEATHER_API_KEY");
        }
        if let Some(provider) = lookup("AIRADVISOR_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("AIRADVISOR_MODEL") {
            self.default_model = model;
        }
        if let Some(port) = lookup("PORT") {
            self.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("PORT is not a valid port: {port}")))?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".airadvisor")
    }

    /// Resolve a possibly-relative path against the config directory.
    pub fn resolve_path(path: &str) -> PathBuf {
        let p = PathBuf::from(path);
        if p.is_absolute() { p } else { Self::config_dir().join(p) }
    }

    /// Absolute path of the profile database.
    pub fn storage_path(&self) -> PathBuf {
        Self::resolve_path(&self.storage.path)
    }

    /// Absolute path of the rule file.
    pub fn rules_path(&self) -> PathBuf {
        Self::resolve_path(&self.rules.path)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.model_timeout_secs == 0 || self.air_quality.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "model_timeout_secs and air_quality.timeout_secs must be > 0".into(),
            ));
        }

        if self.air_quality.geocoder == GeocoderKind::None
            && self.air_quality.fallback_coordinates.is_none()
        {
            return Err(ConfigError::ValidationError(
                "air_quality.geocoder = \"none\" requires air_quality.fallback_coordinates".into(),
            ));
        }

        Ok(())
    }

    /// Check if a language-model API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Check if an air-quality API key is available.
    pub fn has_air_quality_key(&self) -> bool {
        self.air_quality.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            model_timeout_secs: default_model_timeout_secs(),
            gateway: GatewayConfig::default(),
            storage: StorageConfig::default(),
            rules: RulesConfig::default(),
            air_quality: AirQualityConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
