//! # Appointment Store
//!
//! `/api/appointments`, kept sorted by date (earliest first).
//!
//! ## Purchase Rule
//! ```text
//! update(patch)
//!   │
//!   ├─ patch.status = Some(s != Completed) ──► patch.madePurchase = false
//!   │
//!   ├─ PUT /api/appointments/:id
//!   │
//!   └─ patch set a status? ──► returned.enforce_purchase_rule()
//! ```
//! A patch that only flips `made_purchase` is sent as-is and does not touch
//! the status.

use optica_core::{Appointment, AppointmentInput, AppointmentPatch, AppointmentStatus};
use std::ops::Deref;
use std::sync::Arc;

use super::EntityStore;
use crate::config::WritePolicy;
use crate::error::StoreResult;
use crate::gateway::Resource;
use crate::notify::Notifier;
use crate::transport::Transport;

pub struct Appointments;

impl Resource for Appointments {
    const PATH: &'static str = "/api/appointments";
    const NOUN: &'static str = "appointment";
    const PLURAL: &'static str = "appointments";
    type Entity = Appointment;
    type Create = AppointmentInput;

    fn id(entity: &Appointment) -> &str {
        &entity.id
    }

    fn arrange(items: &mut [Appointment]) {
        items.sort_by_key(|a| a.date);
    }
}

pub struct AppointmentStore {
    inner: EntityStore<Appointments>,
}

impl AppointmentStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        policy: WritePolicy,
    ) -> Self {
        AppointmentStore {
            inner: EntityStore::new(transport, notifier, policy),
        }
    }

    /// Schedules an appointment. A purchase flag on anything but a
    /// completed appointment is dropped before sending.
    pub async fn add(&self, input: &AppointmentInput) -> StoreResult<Appointment> {
        let mut input = input.clone();
        if input.status != AppointmentStatus::Completed {
            input.made_purchase = false;
        }
        self.inner
            .add_as(&input, "schedule the appointment".to_string())
            .await
    }

    /// Partial update with the purchase rule applied on both sides of the
    /// call.
    pub async fn update(&self, id: &str, patch: AppointmentPatch) -> StoreResult<Appointment> {
        let mut patch = patch;
        patch.enforce_purchase_rule();
        let sets_status = patch.changes_status();

        self.inner
            .update_with(id, &patch, "update the appointment".to_string(), move |a| {
                if sets_status {
                    a.enforce_purchase_rule();
                }
            })
            .await
    }

    /// Moves the appointment to `status`. Any status may follow any other.
    pub async fn set_status(&self, id: &str, status: AppointmentStatus) -> StoreResult<Appointment> {
        self.update(id, AppointmentPatch::status(status)).await
    }

    /// Records whether the visit ended in a sale, leaving the status alone.
    pub async fn set_made_purchase(&self, id: &str, made_purchase: bool) -> StoreResult<Appointment> {
        self.update(id, AppointmentPatch::made_purchase(made_purchase)).await
    }

    /// Every appointment linked to `client_id`, earliest first.
    pub fn for_client(&self, client_id: &str) -> Vec<Appointment> {
        self.inner.with_items(|items| {
            items
                .iter()
                .filter(|a| a.subject.client_id() == Some(client_id))
                .cloned()
                .collect()
        })
    }
}

impl Deref for AppointmentStore {
    type Target = EntityStore<Appointments>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
