//! # Appointment
//!
//! Scheduled visits (eye exams, pickups, frame adjustments, consultations).
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │             ┌──────────► Confirmed ──┐                                  │
//! │             │                        │                                  │
//! │  Scheduled ─┼──────────► Completed ◄─┘   (made_purchase meaningful)     │
//! │             │                                                           │
//! │             ├──────────► Cancelled                                      │
//! │             └──────────► NoShow                                         │
//! │                                                                         │
//! │  Any status may be reassigned at any time. The one enforced rule:       │
//! │  a status other than Completed forces made_purchase = false.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Subject
//! Current records reference a client by id. Legacy records carry a bare
//! name/phone pair instead. Both shapes are resolved into
//! [`AppointmentSubject`] once, at decode time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Kind & Status
// =============================================================================

/// What the visit is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AppointmentKind {
    #[serde(rename = "Exame de Vista")]
    EyeExam,
    #[serde(rename = "Retirada")]
    Pickup,
    #[serde(rename = "Ajuste de Armação")]
    FrameAdjustment,
    #[serde(rename = "Consulta")]
    Consultation,
}

impl AppointmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentKind::EyeExam => "Exame de Vista",
            AppointmentKind::Pickup => "Retirada",
            AppointmentKind::FrameAdjustment => "Ajuste de Armação",
            AppointmentKind::Consultation => "Consulta",
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "Marcado")]
    Scheduled,
    #[serde(rename = "Confirmado")]
    Confirmed,
    #[serde(rename = "Concluído")]
    Completed,
    #[serde(rename = "Cancelado")]
    Cancelled,
    #[serde(rename = "Não Compareceu")]
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Marcado",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::Completed => "Concluído",
            AppointmentStatus::Cancelled => "Cancelado",
            AppointmentStatus::NoShow => "Não Compareceu",
        }
    }

    /// Still expected to happen (shown in "upcoming" lists).
    pub fn is_open(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    /// Parses either the wire label or the English variant name,
    /// case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        let wanted = input.trim().to_lowercase();
        AppointmentStatus::ALL.into_iter().find(|s| {
            s.label().to_lowercase() == wanted || format!("{:?}", s).to_lowercase() == wanted
        })
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Subject
// =============================================================================

/// Who the appointment is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentSubject {
    /// References a client in the client store.
    LinkedClient(String),
    /// Legacy record with contact data inline.
    WalkInContact { name: String, phone: String },
}

impl AppointmentSubject {
    /// The referenced client id, if any.
    pub fn client_id(&self) -> Option<&str> {
        match self {
            AppointmentSubject::LinkedClient(id) => Some(id),
            AppointmentSubject::WalkInContact { .. } => None,
        }
    }
}

// =============================================================================
// Appointment
// =============================================================================

/// A persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AppointmentRecord", into = "AppointmentRecord")]
pub struct Appointment {
    pub id: String,
    pub subject: AppointmentSubject,
    pub kind: AppointmentKind,
    pub date: DateTime<Utc>,
    pub observation: Option<String>,
    pub status: AppointmentStatus,
    pub made_purchase: bool,
}

impl Appointment {
    /// Applies the status/purchase coupling: anything but Completed clears
    /// the purchase flag.
    pub fn enforce_purchase_rule(&mut self) {
        if self.status != AppointmentStatus::Completed {
            self.made_purchase = false;
        }
    }
}

/// Wire shape of an appointment, including the legacy contact fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentRecord {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    telephone: Option<String>,
    tipo: AppointmentKind,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    observation: Option<String>,
    #[serde(default)]
    status: AppointmentStatus,
    #[serde(default)]
    made_purchase: Option<bool>,
}

impl From<AppointmentRecord> for Appointment {
    fn from(r: AppointmentRecord) -> Self {
        let subject = match r.client_id.filter(|id| !id.is_empty()) {
            Some(id) => AppointmentSubject::LinkedClient(id),
            None => AppointmentSubject::WalkInContact {
                name: r.name.unwrap_or_default(),
                phone: r.telephone.unwrap_or_default(),
            },
        };
        Appointment {
            id: r.id,
            subject,
            kind: r.tipo,
            date: r.date,
            observation: r.observation,
            status: r.status,
            made_purchase: r.made_purchase.unwrap_or(false),
        }
    }
}

impl From<Appointment> for AppointmentRecord {
    fn from(a: Appointment) -> Self {
        let (client_id, name, telephone) = match a.subject {
            AppointmentSubject::LinkedClient(id) => (Some(id), None, None),
            AppointmentSubject::WalkInContact { name, phone } => (None, Some(name), Some(phone)),
        };
        AppointmentRecord {
            id: a.id,
            client_id,
            name,
            telephone,
            tipo: a.kind,
            date: a.date,
            observation: a.observation,
            status: a.status,
            made_purchase: Some(a.made_purchase),
        }
    }
}

// =============================================================================
// Write Models
// =============================================================================

/// Create payload: new appointments always reference an existing client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub client_id: String,
    #[serde(rename = "tipo")]
    pub kind: AppointmentKind,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub made_purchase: bool,
}

impl AppointmentInput {
    /// A freshly scheduled appointment.
    pub fn new(client_id: impl Into<String>, kind: AppointmentKind, date: DateTime<Utc>) -> Self {
        AppointmentInput {
            client_id: client_id.into(),
            kind,
            date,
            observation: None,
            status: AppointmentStatus::Scheduled,
            made_purchase: false,
        }
    }
}

/// Partial update payload. Absent fields are left untouched by the server.
///
/// The client reference is deliberately not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AppointmentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub made_purchase: Option<bool>,
}

impl AppointmentPatch {
    /// Patch changing only the status.
    pub fn status(status: AppointmentStatus) -> Self {
        AppointmentPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Patch changing only the purchase flag.
    pub fn made_purchase(made_purchase: bool) -> Self {
        AppointmentPatch {
            made_purchase: Some(made_purchase),
            ..Default::default()
        }
    }

    /// Forces `made_purchase = false` when the patch moves the status to
    /// anything but Completed, whatever the caller asked for.
    pub fn enforce_purchase_rule(&mut self) {
        if matches!(self.status, Some(s) if s != AppointmentStatus::Completed) {
            self.made_purchase = Some(false);
        }
    }

    /// True when the patch sets a status.
    pub fn changes_status(&self) -> bool {
        self.status.is_some()
    }
}
