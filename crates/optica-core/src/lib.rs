//! # optica-core: Pure Domain Logic for the Optica Data Layer
//!
//! This crate holds the shop's domain model and every computation that does
//! not need the network: money, wire types, validation, the sale draft, and
//! the derived dashboard/report views.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Optica Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Screens / optica-cli                            │   │
//! │  │   Dashboard ──► Clients ──► Products ──► Agenda ──► Sales       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                optica-store (stores + gateway)                  │   │
//! │  │      ClientStore, ProductStore, AppointmentStore, SaleStore     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ optica-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐  │   │
//! │  │  │ client  │ │  money  │ │  draft  │ │validation│ │  views  │  │   │
//! │  │  │ product │ │  Money  │ │SaleDraft│ │  rules   │ │Dashboard│  │   │
//! │  │  │ appt    │ │         │ │         │ │          │ │ Reports │  │   │
//! │  │  │ sale    │ │         │ │         │ │          │ │         │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`client`], [`product`], [`appointment`], [`sale`] - Domain types with
//!   the server's JSON field names
//! - [`money`] - Integer centavos
//! - [`draft`] - The sale being assembled before submission
//! - [`validation`] - Caller-side field rules
//! - [`views`] - Dashboard and report computations
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use optica_core::money::Money;
//!
//! let down = Money::parse_decimal("50,00").unwrap();
//! let total = Money::from_cents(17550);
//! assert_eq!(total.remaining_after(down).cents(), 12550);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod appointment;
pub mod client;
pub mod draft;
pub mod error;
pub mod money;
pub mod product;
pub mod sale;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use appointment::{
    Appointment, AppointmentInput, AppointmentKind, AppointmentPatch, AppointmentStatus,
    AppointmentSubject,
};
pub use client::{Client, ClientInput, EyePrescription};
pub use draft::{DraftLine, SaleDraft};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use product::{Product, ProductCategory, ProductInput};
pub use sale::{
    ClientRef, ClientSummary, Payment, PaymentCondition, PaymentMethod, ProductRef, ProductSummary,
    Sale, SaleInput, SaleItem, SaleItemInput, SaleStatus, ServiceOrder,
};
pub use views::DashboardSummary;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products with stock strictly below this count as "low stock".
pub const LOW_STOCK_THRESHOLD: i64 = 3;

/// Upcoming appointments shown on the dashboard.
pub const UPCOMING_DISPLAY_COUNT: usize = 3;

/// Months kept in the revenue history report.
pub const REVENUE_HISTORY_MONTHS: usize = 6;

/// Maximum lines in a single sale draft.
pub const MAX_DRAFT_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Maximum credit-card installments.
pub const MAX_INSTALLMENTS: u32 = 24;
