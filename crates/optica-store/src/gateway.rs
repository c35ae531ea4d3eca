//! # Remote Data Gateway
//!
//! Typed per-resource facade over the transport.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────┬──────────────────┬────────┬──────────┬──────────┬──────────────────────────┐
//! │ Resource     │ List             │ Create │ Update   │ Delete   │ Special                  │
//! ├──────────────┼──────────────────┼────────┼──────────┼──────────┼──────────────────────────┤
//! │ Clients      │ GET /api/clients │ POST   │ PUT /:id │ DEL /:id │                          │
//! │ Products     │ GET /api/products│ POST   │ PUT /:id │ DEL /:id │                          │
//! │ Appointments │ GET /api/appts.. │ POST   │ PUT /:id │ DEL /:id │                          │
//! │ Sales        │ GET /api/sales   │ POST   │    -     │ DEL /:id │ PUT /:id/os-status       │
//! └──────────────┴──────────────────┴────────┴──────────┴──────────┴──────────────────────────┘
//! ```
//!
//! Non-2xx responses become [`GatewayError::Server`], carrying the body's
//! `message` field when there is one (empty otherwise).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

// =============================================================================
// Resource
// =============================================================================

/// Describes one REST collection.
pub trait Resource: Send + Sync + 'static {
    /// Collection path, e.g. `/api/clients`.
    const PATH: &'static str;

    /// Singular noun used in log lines and user messages ("client").
    const NOUN: &'static str;

    /// Plural noun ("clients").
    const PLURAL: &'static str;

    /// Persisted representation returned by the server.
    type Entity: DeserializeOwned + Clone + Send + Sync + 'static;

    /// Create payload (no identifier).
    type Create: Serialize + Send + Sync;

    /// Server-assigned identifier of an entity.
    fn id(entity: &Self::Entity) -> &str;

    /// Reorders the collection after a load or a write. Default: keep the
    /// order as given.
    fn arrange(_items: &mut [Self::Entity]) {}
}

// =============================================================================
// Gateway
// =============================================================================

/// HTTP calls for one resource.
pub struct Gateway<R: Resource> {
    transport: Arc<dyn Transport>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for Gateway<R> {
    fn clone(&self) -> Self {
        Gateway {
            transport: Arc::clone(&self.transport),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> Gateway<R> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Gateway {
            transport,
            _resource: PhantomData,
        }
    }

    /// `PATH/:id`
    pub fn item_path(id: &str) -> String {
        format!("{}/{}", R::PATH, id)
    }

    /// GET the whole collection.
    ///
    /// Records are decoded one by one. A record that does not fit the entity
    /// is logged and left out; the rest of the collection still loads.
    pub async fn list(&self) -> Result<Vec<R::Entity>, GatewayError> {
        let response = self.call(ApiRequest::get(R::PATH)).await?;
        let records: Vec<Value> = decode(&response)?;
        let total = records.len();

        let items: Vec<R::Entity> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| decode_record::<R>(index, record))
            .collect();

        if items.len() < total {
            warn!(
                resource = R::PLURAL,
                skipped = total - items.len(),
                total,
                "Collection loaded with undecodable records left out"
            );
        }
        Ok(items)
    }

    /// POST a new entity; returns the server's representation.
    pub async fn create(&self, input: &R::Create) -> Result<R::Entity, GatewayError> {
        let body = encode(input)?;
        let response = self.call(ApiRequest::post(R::PATH, body)).await?;
        decode(&response)
    }

    /// PUT a full or partial field set; returns the server's representation.
    pub async fn update<B>(&self, id: &str, body: &B) -> Result<R::Entity, GatewayError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let body = encode(body)?;
        let response = self.call(ApiRequest::put(Self::item_path(id), body)).await?;
        decode(&response)
    }

    /// DELETE by id. The response body is ignored.
    pub async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        self.call(ApiRequest::delete(Self::item_path(id))).await?;
        Ok(())
    }

    /// PUT to a sub-resource of an entity (`PATH/:id/<sub>`).
    ///
    /// These endpoints do not promise an entity back, so a 2xx is the whole
    /// answer and the body is ignored.
    pub async fn put_sub<B>(&self, id: &str, sub: &str, body: &B) -> Result<(), GatewayError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let body = encode(body)?;
        let path = format!("{}/{}", Self::item_path(id), sub);
        self.call(ApiRequest::put(path, body)).await?;
        Ok(())
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let method = request.method;
        let path = request.path.clone();
        debug!(resource = R::NOUN, %method, %path, "Sending request");

        let response = self.transport.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let message = server_message(&response.body).unwrap_or_default();
        warn!(resource = R::NOUN, %method, %path, status = response.status, %message, "Server rejected request");
        Err(GatewayError::Server {
            status: response.status,
            message,
        })
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, GatewayError> {
    serde_json::to_value(body).map_err(|e| GatewayError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, GatewayError> {
    serde_json::from_slice(&response.body).map_err(|e| GatewayError::Decode(e.to_string()))
}

fn decode_record<R: Resource>(index: usize, record: Value) -> Option<R::Entity> {
    let id = record
        .get("_id")
        .and_then(Value::as_str)
        .unwrap_or("?")
        .to_string();
    match serde_json::from_value(record) {
        Ok(entity) => Some(entity),
        Err(e) => {
            warn!(resource = R::NOUN, index, %id, error = %e, "Skipping undecodable record");
            None
        }
    }
}

/// Extracts `{"message": "..."}` from an error body.
fn server_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|m| !m.is_empty())
}
