//! # Sale Store
//!
//! `/api/sales`. A sale is written once as a whole aggregate; afterwards
//! only its service-order sub-status changes.
//!
//! ```text
//! ┌───────────────────────────┬────────────────────────────────────────────┐
//! │ Operation                 │ Wire                                       │
//! ├───────────────────────────┼────────────────────────────────────────────┤
//! │ add(SaleInput)            │ POST /api/sales        (full aggregate)    │
//! │ cancel(id)                │ DELETE /api/sales/:id                      │
//! │ update_service_order_...  │ PUT /api/sales/:id/os-status  {status}     │
//! └───────────────────────────┴────────────────────────────────────────────┘
//! ```

use optica_core::{Sale, SaleInput};
use serde::Serialize;
use std::sync::Arc;

use super::EntityStore;
use crate::config::WritePolicy;
use crate::error::StoreResult;
use crate::gateway::Resource;
use crate::notify::Notifier;
use crate::transport::Transport;

pub struct Sales;

impl Resource for Sales {
    const PATH: &'static str = "/api/sales";
    const NOUN: &'static str = "sale";
    const PLURAL: &'static str = "sales";
    type Entity = Sale;
    type Create = SaleInput;

    fn id(entity: &Sale) -> &str {
        &entity.id
    }
}

#[derive(Serialize)]
struct ServiceOrderStatusBody<'a> {
    status: &'a str,
}

/// Sales, newest first. There is no full update.
pub struct SaleStore {
    inner: EntityStore<Sales>,
}

impl SaleStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        policy: WritePolicy,
    ) -> Self {
        SaleStore {
            inner: EntityStore::new(transport, notifier, policy),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    pub fn snapshot(&self) -> Vec<Sale> {
        self.inner.snapshot()
    }

    pub fn with_items<T>(&self, f: impl FnOnce(&[Sale]) -> T) -> T {
        self.inner.with_items(f)
    }

    pub fn get(&self, id: &str) -> Option<Sale> {
        self.inner.get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Every sale made to `client_id`, whichever shape the reference has.
    pub fn for_client(&self, client_id: &str) -> Vec<Sale> {
        self.inner.with_items(|items| {
            items
                .iter()
                .filter(|s| s.client.id() == Some(client_id))
                .cloned()
                .collect()
        })
    }

    // =========================================================================
    // Loads & Writes
    // =========================================================================

    pub async fn load_initial(&self) -> StoreResult<usize> {
        self.inner.load_initial().await
    }

    pub async fn refresh(&self) -> StoreResult<usize> {
        self.inner.refresh().await
    }

    /// Submits the whole sale. Unit prices are whatever the input carries;
    /// nothing is re-read from the catalog and stock is left to the server.
    pub async fn add(&self, input: &SaleInput) -> StoreResult<Sale> {
        self.inner
            .add_as(input, "save the sale".to_string())
            .await
    }

    /// Cancels a sale. The server deletes it and it leaves the collection.
    pub async fn cancel(&self, id: &str) -> StoreResult<()> {
        self.inner
            .delete_as(id, "cancel the sale".to_string())
            .await
    }

    /// Sets the service-order sub-status ("Aguardando Laboratório",
    /// "Entregue", ...).
    ///
    /// After the server confirms, only `ordemServico.status` changes
    /// locally; see [`Sale::merge_service_order_status`].
    pub async fn update_service_order_status(&self, id: &str, status: &str) -> StoreResult<()> {
        let body = ServiceOrderStatusBody { status };
        let confirmed = status.to_string();

        self.inner
            .put_sub_resource(
                id,
                "os-status",
                &body,
                "update the service order".to_string(),
                move |sale| sale.merge_service_order_status(confirmed),
            )
            .await
    }
}
