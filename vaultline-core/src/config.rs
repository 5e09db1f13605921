//! Configuration management
//!
//! Settings are read from a JSON file:
//! ```json
//! {
//!   "endpointUrl": "https://vault.example.com/api/users",
//!   "pollIntervalMs": 30000,
//!   "appName": "Vaultline",
//!   "version": "0.1.0",
//!   "defaults": { "credit": "700", "status": "Active" }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::RecordDefaults;

/// Environment variable that overrides `endpointUrl` (for CI/testing)
pub const ENDPOINT_URL_ENV: &str = "VAULTLINE_ENDPOINT_URL";

/// Default reconciliation period
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// Default request timeout for the record store
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Raw settings file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, alias = "endpointURL")]
    endpoint_url: Option<String>,
    #[serde(default)]
    poll_interval_ms: Option<u64>,
    #[serde(default)]
    request_timeout_ms: Option<u64>,
    #[serde(default)]
    collection_field: Option<String>,
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    defaults: Option<RecordDefaults>,
}

/// Vaultline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub endpoint_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    /// Name of the array field holding the records in the store response
    pub collection_field: String,
    /// Informational only
    pub app_name: String,
    /// Informational only
    pub version: String,
    pub defaults: RecordDefaults,
}

impl Config {
    /// Create a config for the given endpoint with every other option at its default
    pub fn new(endpoint_url: impl Into<String>) -> Result<Self> {
        let config = Self::new_unchecked(endpoint_url.into());
        config.validate()?;
        Ok(config)
    }

    /// Load config from a settings file
    ///
    /// The endpoint can be supplied or overridden via `VAULTLINE_ENDPOINT_URL`.
    pub fn load(settings_path: &Path) -> Result<Self> {
        let raw = read_settings(settings_path)?;
        Self::from_settings(raw, endpoint_override())
    }

    /// Load config, using `fallback_endpoint` when neither the file nor the
    /// environment names one
    ///
    /// Unreadable or broken settings files are still errors.
    pub fn load_with_fallback_endpoint(settings_path: &Path, fallback_endpoint: &str) -> Result<Self> {
        let mut raw = read_settings(settings_path)?;
        if raw.endpoint_url.is_none() {
            raw.endpoint_url = Some(fallback_endpoint.to_string());
        }
        Self::from_settings(raw, endpoint_override())
    }

    /// Parse config from a JSON string (no environment overrides)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: SettingsFile = serde_json::from_str(json)?;
        Self::from_settings(raw, None)
    }

    fn from_settings(raw: SettingsFile, endpoint_override: Option<String>) -> Result<Self> {
        let endpoint_url = endpoint_override
            .or(raw.endpoint_url)
            .ok_or_else(|| Error::config("endpointUrl is required"))?;

        let mut config = Self::new_unchecked(endpoint_url);
        if let Some(ms) = raw.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = raw.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(field) = raw.collection_field {
            config.collection_field = field;
        }
        if let Some(name) = raw.app_name {
            config.app_name = name;
        }
        if let Some(version) = raw.version {
            config.version = version;
        }
        if let Some(defaults) = raw.defaults {
            config.defaults = defaults;
        }

        config.validate()?;
        Ok(config)
    }

    fn new_unchecked(endpoint_url: String) -> Self {
        Self {
            endpoint_url,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            collection_field: "users".to_string(),
            app_name: "Vaultline".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            defaults: RecordDefaults::default(),
        }
    }

    /// Check option ranges and the endpoint URL
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.endpoint_url)?;
        if self.poll_interval_ms == 0 {
            return Err(Error::config("pollIntervalMs must be greater than zero"));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::config("requestTimeoutMs must be greater than zero"));
        }
        if self.collection_field.trim().is_empty() {
            return Err(Error::config("collectionField cannot be empty"));
        }
        Ok(())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = whole_millis(interval);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = whole_millis(timeout);
        self
    }

    pub fn with_collection_field(mut self, field: impl Into<String>) -> Self {
        self.collection_field = field.into();
        self
    }

    pub fn with_defaults(mut self, defaults: RecordDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(settings_path)?;
    Ok(serde_json::from_str(&content)?)
}

fn endpoint_override() -> Option<String> {
    std::env::var(ENDPOINT_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Milliseconds in `duration`, rounding a non-zero sub-millisecond value up to 1
fn whole_millis(duration: Duration) -> u64 {
    match duration.as_millis() as u64 {
        0 if !duration.is_zero() => 1,
        ms => ms,
    }
}

/// Require an absolute http(s) URL
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let parsed = Url::parse(endpoint)
        .map_err(|e| Error::config(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::config(format!(
            "Endpoint URL must use http or https, got '{}'",
            other
        ))),
    }
}
