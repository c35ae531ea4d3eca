//! # Sale Draft
//!
//! The cart assembled on the counter before a sale is submitted.
//!
//! ## Draft Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Draft Operations                                │
//! │                                                                         │
//! │  Counter Action           Draft Method            State Change          │
//! │  ──────────────           ────────────            ────────────          │
//! │                                                                         │
//! │  Find by code ───────────► add_product() ───────► lines.push(line)     │
//! │                                                   (price snapshot)      │
//! │  Change Quantity ────────► update_quantity() ───► lines[i].qty = n     │
//! │                                                                         │
//! │  Click Remove ───────────► remove_line() ───────► lines.remove(i)      │
//! │                                                                         │
//! │  Fill payment ───────────► payment() ───────────► (derived Payment)    │
//! │                                                                         │
//! │  Save ───────────────────► into_input() ────────► SaleInput            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line ids are transient uuids: they key the lines on screen and are never
//! sent to the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::product::Product;
use crate::sale::{Payment, PaymentCondition, PaymentMethod, SaleInput, SaleItemInput, SaleStatus};
use crate::validation::validate_installments;
use crate::{MAX_DRAFT_LINES, MAX_LINE_QUANTITY};

/// A line in the draft.
///
/// ## Design Notes
/// - `product_id`: reference sent to the server
/// - `code`, `name`, `unit_price`: frozen copy of the product at the moment
///   it was added, so later catalog edits never change the draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    pub line_id: Uuid,
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl DraftLine {
    /// Creates a line from a product, capturing its current sale price.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        DraftLine {
            line_id: Uuid::new_v4(),
            product_id: product.id.clone(),
            code: product.data.code.clone(),
            name: product.data.name.clone(),
            unit_price: product.sale_price(),
            quantity,
        }
    }

    /// unit price × quantity
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The sale being assembled.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product increases
///   quantity)
/// - Quantity is in 1..=999
/// - At most 100 lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    lines: Vec<DraftLine>,
    started_at: DateTime<Utc>,
}

impl SaleDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        SaleDraft {
            lines: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Adds a product or increases its quantity if already present.
    ///
    /// Returns the id of the line that now holds the product.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> CoreResult<Uuid> {
        check_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let new_qty = line.quantity.saturating_add(quantity);
            check_quantity(new_qty)?;
            line.quantity = new_qty;
            return Ok(line.line_id);
        }

        if self.lines.len() >= MAX_DRAFT_LINES {
            return Err(CoreError::DraftTooLarge {
                max: MAX_DRAFT_LINES,
            });
        }

        let line = DraftLine::from_product(product, quantity);
        let id = line.line_id;
        self.lines.push(line);
        Ok(id)
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, line_id: Uuid, quantity: u32) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(line_id);
        }
        check_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by its transient id.
    pub fn remove_line(&mut self, line_id: Uuid) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);

        if self.lines.len() == initial_len {
            Err(CoreError::LineNotFound(line_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.started_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of snapshot line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(DraftLine::line_total).sum()
    }

    /// Derives the payment record for the current total.
    ///
    /// `remaining = max(0, total - down_payment)`. The installment count is
    /// validated only for installment credit-card payments and is forced to
    /// 1 otherwise.
    pub fn payment(
        &self,
        method: PaymentMethod,
        condition: PaymentCondition,
        installments: u32,
        down_payment: Money,
    ) -> CoreResult<Payment> {
        if down_payment.is_negative() {
            return Err(CoreError::InvalidPayment {
                reason: "down payment cannot be negative".to_string(),
            });
        }
        if Payment::uses_installments(method, condition) {
            validate_installments(installments)?;
        }

        Ok(Payment::new(
            self.total(),
            down_payment,
            method,
            condition,
            installments,
        ))
    }

    /// Consumes the draft and builds the create payload.
    ///
    /// ## Errors
    /// - `MissingClient` when `client_id` is blank
    /// - `EmptyDraft` when there are no lines
    /// - `InvalidPayment` when `payment` was derived for a different total
    pub fn into_input(
        self,
        client_id: &str,
        status: SaleStatus,
        payment: Payment,
    ) -> CoreResult<SaleInput> {
        if client_id.trim().is_empty() {
            return Err(CoreError::MissingClient);
        }
        if self.lines.is_empty() {
            return Err(CoreError::EmptyDraft);
        }

        let total = self.total();
        if !payment.is_consistent_with(total) {
            return Err(CoreError::InvalidPayment {
                reason: format!("remaining balance does not match total {}", total),
            });
        }

        let items = self
            .lines
            .into_iter()
            .map(|l| SaleItemInput {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect();

        Ok(SaleInput {
            client_id: client_id.to_string(),
            items,
            total,
            status,
            payment,
        })
    }
}

impl Default for SaleDraft {
    fn default() -> Self {
        Self::new()
    }
}

fn check_quantity(quantity: u32) -> CoreResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantidade".to_string(),
        }
        .into());
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{ProductCategory, ProductInput};

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            data: ProductInput {
                code: format!("COD-{}", id),
                name: format!("Produto {}", id),
                category: ProductCategory::Frame,
                brand: String::new(),
                cost_price: None,
                sale_price: Money::from_cents(price_cents),
                stock: 10,
            },
        }
    }

    #[test]
    fn test_add_product_snapshots_price() {
        let mut draft = SaleDraft::new();
        let mut product = test_product("1", 15000);

        draft.add_product(&product, 2).unwrap();
        product.data.sale_price = Money::from_cents(99900);

        assert_eq!(draft.lines()[0].unit_price.cents(), 15000);
        assert_eq!(draft.total().cents(), 30000);
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut draft = SaleDraft::new();
        let product = test_product("1", 999);

        let first = draft.add_product(&product, 2).unwrap();
        let second = draft.add_product(&product, 3).unwrap();

        assert_eq!(first, second);
        assert_eq!(draft.lines().len(), 1);
        assert_eq!(draft.total_quantity(), 5);
    }

    #[test]
    fn test_quantity_limits() {
        let mut draft = SaleDraft::new();
        let product = test_product("1", 100);

        assert!(matches!(
            draft.add_product(&product, 0),
            Err(CoreError::Validation(_))
        ));
        let line = draft.add_product(&product, 999).unwrap();
        assert!(matches!(
            draft.add_product(&product, 1),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
        assert!(draft.update_quantity(line, 1000).is_err());
        assert_eq!(draft.total_quantity(), 999);
    }

    #[test]
    fn test_line_limit() {
        let mut draft = SaleDraft::new();
        for i in 0..MAX_DRAFT_LINES {
            draft.add_product(&test_product(&i.to_string(), 100), 1).unwrap();
        }
        assert!(matches!(
            draft.add_product(&test_product("extra", 100), 1),
            Err(CoreError::DraftTooLarge { .. })
        ));
    }

    #[test]
    fn test_update_and_remove_lines() {
        let mut draft = SaleDraft::new();
        let a = draft.add_product(&test_product("a", 1000), 1).unwrap();
        let b = draft.add_product(&test_product("b", 500), 1).unwrap();

        draft.update_quantity(a, 3).unwrap();
        assert_eq!(draft.total().cents(), 3500);

        draft.update_quantity(b, 0).unwrap();
        assert_eq!(draft.lines().len(), 1);

        draft.remove_line(a).unwrap();
        assert!(draft.is_empty());
        assert!(matches!(
            draft.remove_line(a),
            Err(CoreError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_payment_derivation() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("1", 50000), 1).unwrap();

        let p = draft
            .payment(
                PaymentMethod::CreditCard,
                PaymentCondition::Installment,
                10,
                Money::from_cents(10000),
            )
            .unwrap();
        assert_eq!(p.remaining.cents(), 40000);
        assert_eq!(p.installments, 10);

        let p = draft
            .payment(PaymentMethod::Pix, PaymentCondition::Upfront, 10, Money::zero())
            .unwrap();
        assert_eq!(p.installments, 1);

        assert!(draft
            .payment(
                PaymentMethod::CreditCard,
                PaymentCondition::Installment,
                30,
                Money::zero()
            )
            .is_err());
        assert!(draft
            .payment(PaymentMethod::Cash, PaymentCondition::Upfront, 1, Money::from_cents(-1))
            .is_err());
    }

    #[test]
    fn test_into_input() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("1", 15000), 2).unwrap();
        let payment = draft
            .payment(PaymentMethod::Cash, PaymentCondition::Upfront, 1, Money::from_cents(5000))
            .unwrap();

        let input = draft
            .clone()
            .into_input("c1", SaleStatus::Completed, payment.clone())
            .unwrap();
        assert_eq!(input.client_id, "c1");
        assert_eq!(input.total.cents(), 30000);
        assert_eq!(input.items[0].product_id, "1");
        assert_eq!(input.items[0].unit_price.cents(), 15000);
        assert_eq!(input.payment.remaining.cents(), 25000);

        assert!(matches!(
            draft.clone().into_input(" ", SaleStatus::Completed, payment.clone()),
            Err(CoreError::MissingClient)
        ));
        assert!(matches!(
            SaleDraft::new().into_input("c1", SaleStatus::Completed, payment.clone()),
            Err(CoreError::EmptyDraft)
        ));

        draft.add_product(&test_product("2", 1000), 1).unwrap();
        assert!(matches!(
            draft.into_input("c1", SaleStatus::Completed, payment),
            Err(CoreError::InvalidPayment { .. })
        ));
    }
}
