//! # Domain Stores
//!
//! Each store holds one collection in memory and keeps it in step with the
//! server.
//!
//! ## Store Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    EntityStore<R> Operations                            │
//! │                                                                         │
//! │  Screen Action          Store Method          Local State Change        │
//! │  ─────────────          ────────────          ──────────────────        │
//! │                                                                         │
//! │  App start ────────────► load_initial() ─────► items = server list     │
//! │  Pull to refresh ──────► refresh() ──────────► items = server list     │
//! │  Save form ────────────► add() ──────────────► items.insert(0, saved)  │
//! │  Edit form ────────────► update() ───────────► items[i] = returned     │
//! │  Delete ───────────────► delete() ───────────► items.remove(i)         │
//! │  Open detail ──────────► get() ──────────────► (read only, local scan) │
//! │                                                                         │
//! │  NOTE: Local state changes only AFTER the server confirms. A failed    │
//! │        call leaves the collection exactly as it was.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! The collection sits behind a `std::sync::RwLock` that is only taken for
//! synchronous reads and swaps, never across an `.await`. Lookups stay
//! synchronous for the screens.

pub mod appointment;
pub mod client;
pub mod product;
pub mod sale;

pub use appointment::{AppointmentStore, Appointments};
pub use client::{ClientStore, Clients};
pub use product::{ProductStore, Products};
pub use sale::{SaleStore, Sales};

use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::config::WritePolicy;
use crate::error::{GatewayError, StoreError, StoreResult};
use crate::gateway::{Gateway, Resource};
use crate::notify::{Notice, Notifier};
use crate::transport::Transport;

/// Who asked for a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Startup fetch: failures are logged only.
    Background,
    /// Explicit user action: failures are logged and notified.
    User,
}

// =============================================================================
// Entity Store
// =============================================================================

/// The generic store contract, implemented once for every resource.
pub struct EntityStore<R: Resource> {
    gateway: Gateway<R>,
    items: RwLock<Vec<R::Entity>>,
    /// Loads currently running.
    loads: AtomicUsize,
    /// Set once any load has resolved, success or not.
    settled: AtomicBool,
    in_flight: Mutex<HashSet<String>>,
    policy: WritePolicy,
    notifier: Arc<dyn Notifier>,
}

impl<R: Resource> EntityStore<R> {
    /// Creates an empty store. `is_loading()` is true until the first load
    /// resolves.
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        policy: WritePolicy,
    ) -> Self {
        EntityStore {
            gateway: Gateway::new(transport),
            items: RwLock::new(Vec::new()),
            loads: AtomicUsize::new(0),
            settled: AtomicBool::new(false),
            in_flight: Mutex::new(HashSet::new()),
            policy,
            notifier,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// True while any load is running, and before the first one resolves.
    pub fn is_loading(&self) -> bool {
        !self.settled.load(Ordering::SeqCst) || self.loads.load(Ordering::SeqCst) > 0
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Clone of the whole collection.
    pub fn snapshot(&self) -> Vec<R::Entity> {
        self.read_items().clone()
    }

    /// Runs `f` over the collection without cloning it.
    pub fn with_items<T>(&self, f: impl FnOnce(&[R::Entity]) -> T) -> T {
        f(&self.read_items())
    }

    pub fn len(&self) -> usize {
        self.read_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_items().is_empty()
    }

    /// Linear scan by identifier.
    pub fn get(&self, id: &str) -> Option<R::Entity> {
        self.find(|e| R::id(e) == id)
    }

    /// First entity matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&R::Entity) -> bool) -> Option<R::Entity> {
        self.read_items().iter().find(|e| predicate(e)).cloned()
    }

    // =========================================================================
    // Loads
    // =========================================================================

    /// Startup fetch. On failure the collection stays as it was and the
    /// error is only logged.
    pub async fn load_initial(&self) -> StoreResult<usize> {
        self.fetch(Trigger::Background).await
    }

    /// User-triggered re-fetch. On failure the user is notified.
    pub async fn refresh(&self) -> StoreResult<usize> {
        self.fetch(Trigger::User).await
    }

    async fn fetch(&self, trigger: Trigger) -> StoreResult<usize> {
        let _loading = LoadingGuard::start(&self.loads, &self.settled);

        match self.gateway.list().await {
            Ok(mut items) => {
                R::arrange(&mut items);
                let count = items.len();
                *self.write_items() = items;
                info!(resource = R::PLURAL, count, "Collection loaded");
                Ok(count)
            }
            Err(source) => {
                let err = StoreError::Remote {
                    action: format!("load {}", R::PLURAL),
                    source,
                };
                match trigger {
                    Trigger::Background => {
                        warn!(resource = R::PLURAL, error = %err, "Background load failed")
                    }
                    Trigger::User => self.report(&err),
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates an entity and puts the server's copy at the front.
    pub async fn add(&self, input: &R::Create) -> StoreResult<R::Entity> {
        self.add_as(input, format!("save the new {}", R::NOUN)).await
    }

    pub(crate) async fn add_as(&self, input: &R::Create, action: String) -> StoreResult<R::Entity> {
        match self.gateway.create(input).await {
            Ok(entity) => {
                debug!(resource = R::NOUN, id = R::id(&entity), "Created");
                self.insert_front(entity.clone());
                Ok(entity)
            }
            Err(source) => Err(self.fail(action, source)),
        }
    }

    /// Sends `body` as the update and stores the server's copy.
    pub async fn update<B>(&self, id: &str, body: &B) -> StoreResult<R::Entity>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.update_with(id, body, format!("update the {}", R::NOUN), |_| {})
            .await
    }

    /// Like [`update`](Self::update), running `finish` on the confirmed
    /// representation before it is stored.
    pub(crate) async fn update_with<B, F>(
        &self,
        id: &str,
        body: &B,
        action: String,
        finish: F,
    ) -> StoreResult<R::Entity>
    where
        B: Serialize + Sync + ?Sized,
        F: FnOnce(&mut R::Entity) + Send,
    {
        let _in_flight = self.begin_write(id, &action)?;

        match self.gateway.update(id, body).await {
            Ok(mut entity) => {
                finish(&mut entity);
                debug!(resource = R::NOUN, id, "Updated");
                self.replace(id, entity.clone());
                Ok(entity)
            }
            Err(source) => Err(self.fail(action, source)),
        }
    }

    /// Deletes on the server, then locally.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.delete_as(id, format!("delete the {}", R::NOUN)).await
    }

    pub(crate) async fn delete_as(&self, id: &str, action: String) -> StoreResult<()> {
        let _in_flight = self.begin_write(id, &action)?;

        match self.gateway.delete(id).await {
            Ok(()) => {
                self.write_items().retain(|e| R::id(e) != id);
                debug!(resource = R::NOUN, id, "Deleted");
                Ok(())
            }
            Err(source) => Err(self.fail(action, source)),
        }
    }

    /// PUTs to `PATH/:id/<sub>` and, once confirmed, applies `apply` to the
    /// local copy in place.
    pub(crate) async fn put_sub_resource<B, F>(
        &self,
        id: &str,
        sub: &str,
        body: &B,
        action: String,
        apply: F,
    ) -> StoreResult<()>
    where
        B: Serialize + Sync + ?Sized,
        F: FnOnce(&mut R::Entity) + Send,
    {
        let _in_flight = self.begin_write(id, &action)?;

        match self.gateway.put_sub(id, sub, body).await {
            Ok(()) => {
                let mut items = self.write_items();
                let held = match items.iter_mut().find(|e| R::id(e) == id) {
                    Some(entity) => {
                        apply(entity);
                        true
                    }
                    None => false,
                };
                if held {
                    R::arrange(&mut items);
                    debug!(resource = R::NOUN, id, sub, "Sub-resource updated");
                } else {
                    warn!(
                        resource = R::NOUN,
                        id,
                        sub,
                        "Server confirmed an update for an entity not held locally; refresh to see it"
                    );
                }
                Ok(())
            }
            Err(source) => Err(self.fail(action, source)),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn read_items(&self) -> RwLockReadGuard<'_, Vec<R::Entity>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_items(&self) -> RwLockWriteGuard<'_, Vec<R::Entity>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts at the front, dropping any older copy with the same id.
    fn insert_front(&self, entity: R::Entity) {
        let mut items = self.write_items();
        let id = R::id(&entity).to_string();
        items.retain(|e| R::id(e) != id);
        items.insert(0, entity);
        R::arrange(&mut items);
    }

    /// Replaces the entity stored under `id`, if it is still there.
    fn replace(&self, id: &str, entity: R::Entity) {
        let mut items = self.write_items();
        if let Some(slot) = items.iter_mut().find(|e| R::id(e) == id) {
            *slot = entity;
        }
        R::arrange(&mut items);
    }

    fn begin_write(&self, id: &str, action: &str) -> StoreResult<Option<InFlightGuard<'_>>> {
        if self.policy == WritePolicy::LastResponseWins {
            return Ok(None);
        }

        let mut pending = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(id.to_string()) {
            let err = StoreError::WriteInFlight {
                action: action.to_string(),
                id: id.to_string(),
            };
            drop(pending);
            self.report(&err);
            return Err(err);
        }

        Ok(Some(InFlightGuard {
            pending: &self.in_flight,
            id: id.to_string(),
        }))
    }

    fn fail(&self, action: String, source: GatewayError) -> StoreError {
        let err = StoreError::Remote { action, source };
        self.report(&err);
        err
    }

    fn report(&self, err: &StoreError) {
        warn!(resource = R::NOUN, error = %err, "Store operation failed");
        self.notifier.notify(Notice::from_error(err));
    }
}

/// Counts one running load, however it ends.
struct LoadingGuard<'a> {
    loads: &'a AtomicUsize,
    settled: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn start(loads: &'a AtomicUsize, settled: &'a AtomicBool) -> Self {
        loads.fetch_add(1, Ordering::SeqCst);
        LoadingGuard { loads, settled }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.settled.store(true, Ordering::SeqCst);
        self.loads.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Marks an entity id as having a write in flight until dropped.
struct InFlightGuard<'a> {
    pending: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

// =============================================================================
// Shared test fixtures
// =============================================================================
