//! # Sale
//!
//! A sale is an aggregate written in one request:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale                                                                   │
//! │  ├── cliente ──────────► ClientRef  (id | populated | null)             │
//! │  ├── produtos[] ───────► SaleItem                                       │
//! │  │                       ├── produto ──► ProductRef (id | populated)    │
//! │  │                       ├── quantidade                                 │
//! │  │                       └── valorUnitario  (frozen at time of sale)    │
//! │  ├── valorTotal                                                         │
//! │  ├── dataVenda                                                          │
//! │  ├── status            Concluído | Pendente | Cancelado                 │
//! │  ├── pagamento ────────► Payment                                        │
//! │  │                       valorRestante = max(0, total - valorEntrada)   │
//! │  └── ordemServico? ────► ServiceOrder { status, ...preserved }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `valorUnitario` is the product's sale price at the moment the sale was
//! drafted. Later catalog price changes never touch existing sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Enumerations
// =============================================================================

/// Primary sale status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SaleStatus {
    #[default]
    #[serde(rename = "Concluído")]
    Completed,
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl SaleStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "Concluído",
            SaleStatus::Pending => "Pendente",
            SaleStatus::Cancelled => "Cancelado",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[serde(rename = "Dinheiro")]
    Cash,
    #[serde(rename = "Pix")]
    Pix,
    #[serde(rename = "Cartão de Débito")]
    DebitCard,
    #[serde(rename = "Cartão de Crédito")]
    CreditCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Pix,
        PaymentMethod::DebitCard,
        PaymentMethod::CreditCard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::CreditCard => "Cartão de Crédito",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upfront or in installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentCondition {
    #[serde(rename = "À vista")]
    Upfront,
    #[serde(rename = "A prazo")]
    Installment,
}

impl PaymentCondition {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentCondition::Upfront => "À vista",
            PaymentCondition::Installment => "A prazo",
        }
    }
}

impl fmt::Display for PaymentCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Payment sub-record of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "valorEntrada")]
    pub down_payment: Money,

    #[serde(rename = "valorRestante")]
    pub remaining: Money,

    #[serde(rename = "metodoPagamento")]
    pub method: PaymentMethod,

    #[serde(rename = "condicaoPagamento")]
    pub condition: PaymentCondition,

    #[serde(rename = "parcelas", default = "one")]
    pub installments: u32,
}

fn one() -> u32 {
    1
}

impl Payment {
    /// Builds a payment for `total`, deriving the remaining balance.
    ///
    /// `installments` only survives for installment credit-card payments;
    /// every other combination is recorded as a single installment.
    pub fn new(
        total: Money,
        down_payment: Money,
        method: PaymentMethod,
        condition: PaymentCondition,
        installments: u32,
    ) -> Self {
        let installments = if Self::uses_installments(method, condition) {
            installments.max(1)
        } else {
            1
        };
        Payment {
            id: None,
            down_payment,
            remaining: total.remaining_after(down_payment),
            method,
            condition,
            installments,
        }
    }

    /// Whether the installment count is meaningful for this combination.
    pub fn uses_installments(method: PaymentMethod, condition: PaymentCondition) -> bool {
        method == PaymentMethod::CreditCard && condition == PaymentCondition::Installment
    }

    /// Checks `remaining == max(0, total - down_payment)`.
    pub fn is_consistent_with(&self, total: Money) -> bool {
        self.remaining == total.remaining_after(self.down_payment)
    }
}

// =============================================================================
// References (bare id, populated object, or gone)
// =============================================================================

/// The client fields a populated sale carries.
///
/// The server may send the whole record or only a projection of it, so
/// everything but the id is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientSummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}

/// A sale's client.
///
/// `Missing` is what the server sends (`null`) once the client was deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum ClientRef {
    Unresolved(String),
    Resolved(ClientSummary),
    #[default]
    Missing,
}

impl ClientRef {
    /// The client id, unless the client is gone.
    pub fn id(&self) -> Option<&str> {
        match self {
            ClientRef::Unresolved(id) => Some(id.as_str()),
            ClientRef::Resolved(client) => Some(client.id.as_str()),
            ClientRef::Missing => None,
        }
    }

    /// The populated client, when the server sent one.
    pub fn resolved(&self) -> Option<&ClientSummary> {
        match self {
            ClientRef::Resolved(client) => Some(client),
            _ => None,
        }
    }

    /// The populated name, if any.
    pub fn name(&self) -> Option<&str> {
        self.resolved().and_then(|c| c.full_name.as_deref())
    }
}

/// The product fields a populated sale line carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "codigo", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "precoVenda", default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Money>,
}

/// A sale line's product. `Missing` once the product was deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum ProductRef {
    Unresolved(String),
    Resolved(ProductSummary),
    #[default]
    Missing,
}

impl ProductRef {
    /// The product id, unless the product is gone.
    pub fn id(&self) -> Option<&str> {
        match self {
            ProductRef::Unresolved(id) => Some(id.as_str()),
            ProductRef::Resolved(product) => Some(product.id.as_str()),
            ProductRef::Missing => None,
        }
    }

    /// The populated product, when the server sent one.
    pub fn resolved(&self) -> Option<&ProductSummary> {
        match self {
            ProductRef::Resolved(product) => Some(product),
            _ => None,
        }
    }

    /// What a sale screen shows for the line: the product name, its id, or
    /// "Produto removido".
    pub fn label(&self) -> &str {
        match self {
            ProductRef::Resolved(p) => p.name.as_deref().unwrap_or(p.id.as_str()),
            ProductRef::Unresolved(id) => id,
            ProductRef::Missing => "Produto removido",
        }
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item on a persisted sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "produto", default)]
    pub product: ProductRef,

    #[serde(rename = "quantidade")]
    pub quantity: u32,

    /// Unit price frozen at time of sale.
    #[serde(rename = "valorUnitario")]
    pub unit_price: Money,
}

impl SaleItem {
    /// unit price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Service Order
// =============================================================================

/// Lab/service-order workflow attached to a sale ("Aguardando Laboratório",
/// "Pronto para Retirada", "Entregue", ...).
///
/// Fields other than `status` are kept verbatim so a local sub-status merge
/// never drops data the server sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceOrder {
    #[serde(default)]
    pub status: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "cliente", default)]
    pub client: ClientRef,

    #[serde(rename = "produtos", default)]
    pub items: Vec<SaleItem>,

    #[serde(rename = "valorTotal")]
    pub total: Money,

    #[serde(rename = "dataVenda")]
    pub sold_at: DateTime<Utc>,

    #[serde(default)]
    pub status: SaleStatus,

    #[serde(rename = "pagamento")]
    pub payment: Payment,

    #[serde(rename = "ordemServico", default, skip_serializing_if = "Option::is_none")]
    pub service_order: Option<ServiceOrder>,
}

impl Sale {
    /// Applies a server-confirmed service-order sub-status.
    ///
    /// ## Merge Contract
    /// - Touches: `service_order.status` only (creating the service order
    ///   if the sale had none)
    /// - Preserves: every other sale field and every other service-order
    ///   field
    pub fn merge_service_order_status(&mut self, status: impl Into<String>) {
        let order = self.service_order.get_or_insert_with(ServiceOrder::default);
        order.status = status.into();
    }

    /// Current service-order sub-status, if any.
    pub fn service_order_status(&self) -> Option<&str> {
        self.service_order.as_ref().map(|o| o.status.as_str())
    }

    /// Sum of line totals (the recorded `total` is authoritative).
    pub fn items_total(&self) -> Money {
        self.items.iter().map(SaleItem::line_total).sum()
    }

    /// Total number of units sold.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

// =============================================================================
// Write Models
// =============================================================================

/// A line item on the create payload (product by id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItemInput {
    #[serde(rename = "produto")]
    pub product_id: String,

    #[serde(rename = "quantidade")]
    pub quantity: u32,

    #[serde(rename = "valorUnitario")]
    pub unit_price: Money,
}

/// Create payload for a sale: the whole aggregate in one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleInput {
    #[serde(rename = "cliente")]
    pub client_id: String,

    #[serde(rename = "produtos")]
    pub items: Vec<SaleItemInput>,

    #[serde(rename = "valorTotal")]
    pub total: Money,

    pub status: SaleStatus,

    #[serde(rename = "pagamento")]
    pub payment: Payment,
}
