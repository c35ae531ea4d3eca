//! # optica-store: Gateway and Domain Stores
//!
//! This crate keeps the shop's four collections in memory and in step with
//! the REST API. Every network call the data layer makes goes through here.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Data Layer Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  AppState (built at the app root)                │  │
//! │  │   load_initial() / refresh_all()  ──  tokio::join! of 4 stores   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │     ┌────────────┬────────────┼─────────────┬────────────┐             │
//! │     ▼            ▼            ▼             ▼            │             │
//! │  ┌────────┐ ┌─────────┐ ┌─────────────┐ ┌────────┐       │             │
//! │  │Clients │ │Products │ │Appointments │ │ Sales  │       │             │
//! │  │by CPF  │ │by codigo│ │sorted, rule │ │os-stat │       │             │
//! │  └───┬────┘ └────┬────┘ └──────┬──────┘ └───┬────┘       │             │
//! │      └───────────┴─────┬───────┴────────────┘            │             │
//! │                        ▼                                  ▼             │
//! │              EntityStore<R>                        Notifier (user)      │
//! │       RwLock<Vec<R::Entity>> + load counter                             │
//! │       non-optimistic writes, WritePolicy                                │
//! │                        │                                                │
//! │                        ▼                                                │
//! │              Gateway<R> ──► dyn Transport ──► HttpTransport (reqwest)   │
//! │                                                                         │
//! │  GUARANTEES:                                                            │
//! │  • Local state changes only after the server confirms a write          │
//! │  • A failed call leaves the collection exactly as it was               │
//! │  • No identifier appears twice in a collection                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - API location, timeout, token, write policy
//! - [`error`] - Gateway, store and config errors
//! - [`transport`] - The I/O seam and its reqwest implementation
//! - [`gateway`] - Typed per-resource REST calls
//! - [`stores`] - The generic store and the four domain stores
//! - [`notify`] - User-facing notices for failed actions
//! - [`state`] - `AppState`, the container wiring it all together

pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod state;
pub mod stores;
pub mod transport;

pub use config::{ApiConfig, WritePolicy};
pub use error::{ConfigError, GatewayError, StoreError, StoreResult};
pub use gateway::{Gateway, Resource};
pub use notify::{Notice, Notifier, TracingNotifier};
pub use state::{AppState, LoadReport};
pub use stores::{AppointmentStore, ClientStore, EntityStore, ProductStore, SaleStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
