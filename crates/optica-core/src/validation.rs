//! # Validation Module
//!
//! Input validation utilities for the shop's forms and command surface.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (form / CLI)                                          │
//! │  └── THIS MODULE: field rules, decimal parsing                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Stores (optica-store)                                        │
//! │  └── No checks: payloads are trusted and sent as-is                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Server                                                       │
//! │  ├── Required fields, schema types                                     │
//! │  └── Rejections come back as GatewayError::Server                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use optica_core::validation::{normalize_cpf, validate_code, validate_quantity};
//!
//! validate_code("RB3025").unwrap();
//! validate_quantity(2).unwrap();
//! assert_eq!(normalize_cpf("123.456.789-00"), "12345678900");
//! ```

use crate::error::ValidationError;
use crate::{MAX_INSTALLMENTS, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Normalization
// =============================================================================

/// Strips CPF punctuation (`.` and `-`) and surrounding whitespace.
///
/// Both the stored value and the query go through this before comparison.
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.trim().chars().filter(|c| *c != '.' && *c != '-').collect()
}

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a client's full name.
///
/// ## Rules
/// - Must not be empty
/// - At most 120 characters
pub fn validate_full_name(name: &str) -> ValidationResult<()> {
    required("fullName", name)?;
    max_len("fullName", name, 120)
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - At least 8 digits once punctuation is ignored
/// - Only digits, spaces, `+`, `-`, `(`, `)`
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    required("phone", phone)?;

    if !phone
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits and phone punctuation".to_string(),
        });
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < 8 {
        return Err(ValidationError::TooShort {
            field: "phone".to_string(),
            min: 8,
        });
    }

    Ok(())
}

/// Validates a CPF as typed (punctuation allowed).
///
/// ## Rules
/// - Empty is allowed (CPF is optional)
/// - Otherwise exactly 11 digits after [`normalize_cpf`]
///
/// Check digits are not verified; the shop often records CPFs read over
/// the phone and fixes them later.
pub fn validate_cpf(cpf: &str) -> ValidationResult<()> {
    let normalized = normalize_cpf(cpf);
    if normalized.is_empty() {
        return Ok(());
    }

    if normalized.len() != 11 || !normalized.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "cpf".to_string(),
            reason: "must have 11 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a product code (SKU).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, numbers, hyphens, underscores, dots
///
/// ## Example
/// ```rust
/// use optica_core::validation::validate_code;
///
/// assert!(validate_code("RB-3025").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();
    required("codigo", code)?;
    max_len("codigo", code, 50)?;

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::InvalidFormat {
            field: "codigo".to_string(),
            reason: "must contain only letters, numbers, hyphens, underscores, and dots"
                .to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("nome", name)?;
    max_len("nome", name, 200)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantidade".to_string(),
        });
    }

    if qty > i64::from(MAX_LINE_QUANTITY) {
        return Err(ValidationError::OutOfRange {
            field: "quantidade".to_string(),
            min: 1,
            max: i64::from(MAX_LINE_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a price in centavos. Zero is allowed (courtesy items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "preco".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock quantity.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "estoque".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an installment count (1..=MAX_INSTALLMENTS).
pub fn validate_installments(count: u32) -> ValidationResult<()> {
    if count == 0 || count > MAX_INSTALLMENTS {
        return Err(ValidationError::OutOfRange {
            field: "parcelas".to_string(),
            min: 1,
            max: i64::from(MAX_INSTALLMENTS),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cpf() {
        assert_eq!(normalize_cpf("123.456.789-00"), "12345678900");
        assert_eq!(normalize_cpf(" 12345678900 "), "12345678900");
        assert_eq!(normalize_cpf(""), "");
    }

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Maria Silva").is_ok());
        assert!(validate_full_name("   ").is_err());
        assert!(validate_full_name(&"a".repeat(121)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("(11) 99999-0000").is_ok());
        assert!(validate_phone("+55 11 3333-4444").is_ok());

        assert!(matches!(
            validate_phone("1234"),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(matches!(
            validate_phone("call me"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_phone(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_cpf() {
        assert!(validate_cpf("").is_ok());
        assert!(validate_cpf("123.456.789-00").is_ok());
        assert!(validate_cpf("123.456.789").is_err());
        assert!(validate_cpf("123.456.789-0a").is_err());
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("RB3025").is_ok());
        assert!(validate_code("LC-01.5").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("a b").is_err());
        assert!(validate_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_prices_and_stock() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
    }

    #[test]
    fn test_validate_installments() {
        assert!(validate_installments(1).is_ok());
        assert!(validate_installments(24).is_ok());
        assert!(validate_installments(0).is_err());
        assert!(validate_installments(25).is_err());
    }
}
