//! # Store Error Types
//!
//! Error types for the gateway, the stores, and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  GatewayError   │  │   StoreError    │  │     ConfigError         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Server (non-2xx│  │  Remote (action │  │  InvalidUrl             │ │
//! │  │   + message)    │  │   + gateway err)│  │  InvalidValue           │ │
//! │  │  Network        │  │  WriteInFlight  │  │  LoadFailed             │ │
//! │  │  Decode/Encode  │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Flow: Transport → GatewayError → StoreError → Notifier + caller        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Gateway Error
// =============================================================================

/// A failed call to the shop API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Non-2xx response. `message` comes from the body's `message` field
    /// when the server sent one, empty otherwise.
    #[error("Server responded with HTTP {status} {message}")]
    Server { status: u16, message: String },

    /// The request never got a response (refused, DNS, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not the expected JSON.
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("Could not encode request: {0}")]
    Encode(String),

    /// The request could not be built (bad URL, bad header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// True for connectivity failures the user can fix by trying again.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network(_) => true,
            GatewayError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Network(format!("request timed out: {}", err))
        } else if err.is_builder() {
            GatewayError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::InvalidRequest(err.to_string())
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// What a store operation reports to its caller.
///
/// On any error the store's collection is exactly what it was before the
/// call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote call failed; `action` names what the user tried to do.
    #[error("Could not {action}: {source}")]
    Remote {
        action: String,
        #[source]
        source: GatewayError,
    },

    /// Another write to the same entity has not resolved yet.
    #[error("Could not {action}: another change to {id} is still being saved")]
    WriteInFlight { action: String, id: String },
}

impl StoreError {
    /// Message suitable for a user-facing notification.
    ///
    /// Prefers the server's own explanation when it gave one.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Remote {
                source: GatewayError::Server { message, .. },
                ..
            } if !message.is_empty() => message.clone(),
            StoreError::Remote { action, .. } => format!("Could not {}.", action),
            StoreError::WriteInFlight { .. } => {
                "Another change to this record is still being saved. Try again in a moment."
                    .to_string()
            }
        }
    }

    /// True when trying again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Remote { source, .. } => source.is_retryable(),
            StoreError::WriteInFlight { .. } => true,
        }
    }

    /// The underlying gateway error, if any.
    pub fn gateway(&self) -> Option<&GatewayError> {
        match self {
            StoreError::Remote { source, .. } => Some(source),
            StoreError::WriteInFlight { .. } => None,
        }
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Base URL does not parse or is not http(s).
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// A setting has an unusable value.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// The config file exists but could not be read or parsed.
    #[error("Failed to load config: {0}")]
    LoadFailed(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<url::ParseError> for ConfigError {
    fn from(err: url::ParseError) -> Self {
        ConfigError::InvalidUrl(err.to_string())
    }
}
