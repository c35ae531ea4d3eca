//! # Transport
//!
//! The single I/O seam of the data layer.
//!
//! ```text
//! ┌──────────────┐   ApiRequest    ┌────────────────┐   HTTP/JSON   ┌──────────┐
//! │  Gateway<R>  │ ──────────────► │ dyn Transport  │ ────────────► │ Shop API │
//! │              │ ◄────────────── │                │ ◄──────────── │          │
//! └──────────────┘   ApiResponse   └────────────────┘               └──────────┘
//!                                    │
//!                                    ├── HttpTransport (reqwest)
//!                                    └── ScriptedTransport (tests)
//! ```
//!
//! A transport returns every response it receives, whatever the status.
//! Mapping non-2xx to errors is the gateway's job.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::error::GatewayError;

// =============================================================================
// Request / Response
// =============================================================================

/// HTTP verbs used by the shop API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path, e.g. `/api/clients/abc`.
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        ApiRequest {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        ApiRequest {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Sends one request and waits for its response.
///
/// Implementations must be shareable between the four stores.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError>;
}

// =============================================================================
// HTTP Transport
// =============================================================================

/// `reqwest`-backed transport with JSON bodies, a request timeout, and an
/// optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Builds the client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let base_url = config
            .base_url()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = config.token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GatewayError::InvalidRequest(format!("invalid auth header: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(HttpTransport { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, GatewayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let url = self.url_for(&request.path)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(method = %request.method, path = %request.path, status, "API response");

        Ok(ApiResponse { status, body })
    }
}

// =============================================================================
// Scripted Transport (tests)
// =============================================================================

#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Step {
        reply: Result<ApiResponse, GatewayError>,
        delay: Option<Duration>,
    }

    /// Replays queued replies in the order requests arrive and records every
    /// request it saw.
    ///
    /// The reply is taken from the queue before any delay, so the order in
    /// which calls start decides which reply they get.
    #[derive(Default)]
    pub struct ScriptedTransport {
        steps: Mutex<VecDeque<Step>>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(&self, reply: Result<ApiResponse, GatewayError>, delay: Option<Duration>) {
            self.steps
                .lock()
                .unwrap()
                .push_back(Step { reply, delay });
        }

        /// Queues a JSON reply.
        pub fn reply(&self, status: u16, body: Value) -> &Self {
            self.push(
                Ok(ApiResponse {
                    status,
                    body: serde_json::to_vec(&body).unwrap(),
                }),
                None,
            );
            self
        }

        /// Queues a JSON reply that arrives after `delay`.
        pub fn reply_after(&self, delay: Duration, status: u16, body: Value) -> &Self {
            self.push(
                Ok(ApiResponse {
                    status,
                    body: serde_json::to_vec(&body).unwrap(),
                }),
                Some(delay),
            );
            self
        }

        /// Queues an empty-bodied reply.
        pub fn reply_empty(&self, status: u16) -> &Self {
            self.reply_raw(status, Vec::new())
        }

        /// Queues a reply with a body that need not be JSON.
        pub fn reply_raw(&self, status: u16, body: Vec<u8>) -> &Self {
            self.push(Ok(ApiResponse { status, body }), None);
            self
        }

        /// Queues a connectivity failure.
        pub fn fail_network(&self) -> &Self {
            self.push(Err(GatewayError::Network("connection refused".into())), None);
            self
        }

        /// Every request sent so far.
        pub fn requests(&self) -> Vec<ApiRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
            self.seen.lock().unwrap().push(request.clone());
            let step = self.steps.lock().unwrap().pop_front();

            let Some(step) = step else {
                return Err(GatewayError::Network(format!(
                    "no scripted reply for {} {}",
                    request.method, request.path
                )));
            };
            if let Some(delay) = step.delay {
                tokio::time::sleep(delay).await;
            }
            step.reply
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_joins_paths() {
        let mut config = ApiConfig::default();
        config.server.url = Some("http://192.168.0.84:4000/".into());
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(
            transport.url_for("/api/clients/abc").unwrap().as_str(),
            "http://192.168.0.84:4000/api/clients/abc"
        );
    }

    #[test]
    fn test_http_transport_keeps_base_path() {
        let mut config = ApiConfig::default();
        config.server.url = Some("https://shop.example/v1".into());
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(
            transport.url_for("/api/sales").unwrap().as_str(),
            "https://shop.example/v1/api/sales"
        );
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let mut config = ApiConfig::default();
        config.server.token = Some("bad\ntoken".into());
        assert!(matches!(
            HttpTransport::new(&config),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_scripted_transport_replays_in_order() {
        let transport = scripted::ScriptedTransport::new();
        transport.reply(200, serde_json::json!([])).fail_network();

        let first = transport.send(ApiRequest::get("/api/clients")).await.unwrap();
        assert!(first.is_success());
        assert!(transport.send(ApiRequest::get("/api/clients")).await.is_err());
        assert!(transport.send(ApiRequest::get("/api/clients")).await.is_err());
        assert_eq!(transport.requests().len(), 3);
    }
}
