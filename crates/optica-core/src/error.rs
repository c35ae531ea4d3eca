//! # Error Types
//!
//! Domain-specific error types for optica-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  optica-core errors (this file)                                        │
//! │  ├── CoreError        - Draft/business rule failures                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  optica-store errors (separate crate)                                  │
//! │  ├── GatewayError     - HTTP/transport failures                        │
//! │  └── StoreError       - What a store operation reports                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → (caller) → user notification      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while assembling a sale draft.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The draft has no client selected.
    #[error("A client must be selected before saving the sale")]
    MissingClient,

    /// The draft has no line items.
    #[error("A sale needs at least one product")]
    EmptyDraft,

    /// Draft line not found by its transient id.
    #[error("Draft line not found: {0}")]
    LineNotFound(String),

    /// Draft has exceeded maximum allowed lines.
    #[error("A sale cannot have more than {max} products")]
    DraftTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u32, max: u32 },

    /// Payment fields are inconsistent.
    #[error("Invalid payment: {reason}")]
    InvalidPayment { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used by callers (forms, CLI) before handing data to a store; the stores
/// themselves trust their input and the server.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad decimal, bad CPF).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
