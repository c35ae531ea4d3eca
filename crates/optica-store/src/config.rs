//! # API Configuration
//!
//! Where the shop API lives and how the stores talk to it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     OPTICA_API_URL=http://192.168.0.84:4000                            │
//! │     OPTICA_API_TOKEN=eyJhbGciOi...                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/optica/config.toml (Linux)                               │
//! │     ~/Library/Application Support/com.optica.optica/config.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:4000, 15 s timeout, last-response-wins            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! host = "192.168.0.84"
//! port = 4000
//! # url = "https://api.example.com"   # overrides host/port when set
//! timeout_secs = 15
//!
//! [stores]
//! write_policy = "last_response_wins"  # or "reject_concurrent"
//! low_stock_threshold = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;

// =============================================================================
// Write Policy
// =============================================================================

/// What a store does when a second write to the same entity starts before
/// the first one resolves.
///
/// ```text
/// LAST_RESPONSE_WINS (Default)        │  REJECT_CONCURRENT
/// ────────────────────────────        │  ─────────────────
/// • Both requests go out               │  • Second write fails fast with
/// • Whichever response arrives last    │    StoreError::WriteInFlight
///   overwrites local state             │  • No request is sent for it
/// • No version check                   │  • Local state untouched
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    #[default]
    LastResponseWins,
    RejectConcurrent,
}

impl std::fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WritePolicy::LastResponseWins => write!(f, "last_response_wins"),
            WritePolicy::RejectConcurrent => write!(f, "reject_concurrent"),
        }
    }
}

impl std::str::FromStr for WritePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "last_response_wins" | "last_wins" => Ok(WritePolicy::LastResponseWins),
            "reject_concurrent" | "reject" => Ok(WritePolicy::RejectConcurrent),
            other => Err(ConfigError::InvalidValue {
                key: "write_policy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Server Settings
// =============================================================================

/// How to reach the shop API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Full base URL. Takes precedence over `host`/`port` when set.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token obtained from the login flow.
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_timeout() -> u64 {
    15
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            url: None,
            host: default_host(),
            port: default_port(),
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Behavior of the in-memory stores and dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub write_policy: WritePolicy,

    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,
}

fn default_low_stock() -> i64 {
    optica_core::LOW_STOCK_THRESHOLD
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            write_policy: WritePolicy::default(),
            low_stock_threshold: default_low_stock(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete data-layer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub stores: StoreSettings,
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Applies `OPTICA_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OPTICA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.server.url = Some(url);
        }

        if let Some(host) = lookup("OPTICA_API_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("OPTICA_API_PORT") {
            self.server.port = parse_value("OPTICA_API_PORT", &port)?;
        }

        if let Some(token) = lookup("OPTICA_API_TOKEN") {
            self.server.token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(secs) = lookup("OPTICA_HTTP_TIMEOUT_SECS") {
            self.server.timeout_secs = parse_value("OPTICA_HTTP_TIMEOUT_SECS", &secs)?;
        }

        if let Some(policy) = lookup("OPTICA_WRITE_POLICY") {
            self.stores.write_policy = policy.parse()?;
            debug!(policy = %self.stores.write_policy, "Overriding write policy from environment");
        }

        if let Some(threshold) = lookup("OPTICA_LOW_STOCK_THRESHOLD") {
            self.stores.low_stock_threshold = parse_value("OPTICA_LOW_STOCK_THRESHOLD", &threshold)?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;

        if self.server.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        if self.stores.low_stock_threshold < 0 {
            return Err(ConfigError::InvalidValue {
                key: "low_stock_threshold".to_string(),
                value: self.stores.low_stock_threshold.to_string(),
            });
        }

        Ok(())
    }

    /// The API base URL: `server.url` if set, otherwise `http://host:port`.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = match &self.server.url {
            Some(url) => url.clone(),
            None => format!("http://{}:{}", self.server.host, self.server.port),
        };

        let url = Url::parse(&raw)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                raw
            )));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!("API URL has no host: {}", raw)));
        }

        Ok(url)
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    /// Bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.server.token.as_deref()
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "optica", "optica")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
