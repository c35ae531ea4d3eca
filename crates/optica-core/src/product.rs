//! # Product
//!
//! Catalog entries: frames, sunglasses, lenses, contact lenses, accessories.
//!
//! ## Dual-Key Identity
//! - `id` (`_id`): server-assigned, used for references from sales
//! - `code` (`codigo`): human-entered SKU, looked up case-insensitively

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product Category
// =============================================================================

/// Fixed product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProductCategory {
    #[serde(rename = "Óculos de Grau")]
    Frame,
    #[serde(rename = "Óculos de Sol")]
    Sunglasses,
    #[serde(rename = "Lente")]
    Lens,
    #[serde(rename = "Lente de Contato")]
    ContactLens,
    #[serde(rename = "Acessório")]
    Accessory,
    #[serde(rename = "Outro")]
    Other,
}

impl ProductCategory {
    /// Every category, in catalog order.
    pub const ALL: [ProductCategory; 6] = [
        ProductCategory::Frame,
        ProductCategory::Sunglasses,
        ProductCategory::Lens,
        ProductCategory::ContactLens,
        ProductCategory::Accessory,
        ProductCategory::Other,
    ];

    /// Label used on the wire and in the shop's screens.
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Frame => "Óculos de Grau",
            ProductCategory::Sunglasses => "Óculos de Sol",
            ProductCategory::Lens => "Lente",
            ProductCategory::ContactLens => "Lente de Contato",
            ProductCategory::Accessory => "Acessório",
            ProductCategory::Other => "Outro",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product fields minus the identifier (create and full-replace payload).
///
/// Prices and stock are not range-checked here; see
/// [`crate::validation`] for the caller-side checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    #[serde(rename = "codigo")]
    pub code: String,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "tipo")]
    pub category: ProductCategory,

    #[serde(rename = "marca", default, deserialize_with = "null_as_empty")]
    pub brand: String,

    #[serde(rename = "precoCusto", default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,

    #[serde(rename = "precoVenda")]
    pub sale_price: Money,

    #[serde(rename = "estoque")]
    pub stock: i64,
}

/// Older records carry `"marca": null`.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A persisted catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub data: ProductInput,
}

impl Product {
    /// Current catalog sale price.
    #[inline]
    pub fn sale_price(&self) -> Money {
        self.data.sale_price
    }

    /// Units on hand.
    #[inline]
    pub fn stock(&self) -> i64 {
        self.data.stock
    }

    /// Case-insensitive SKU comparison.
    pub fn matches_code(&self, code: &str) -> bool {
        self.data.code.to_lowercase() == code.to_lowercase()
    }

    /// True when stock is strictly below `threshold`.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.data.stock < threshold
    }

    /// Gross margin per unit, when a cost price is on file.
    pub fn unit_margin(&self) -> Option<Money> {
        self.data.cost_price.map(|cost| self.data.sale_price - cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, stock: i64) -> Product {
        Product {
            id: format!("p-{}", code),
            data: ProductInput {
                code: code.to_string(),
                name: "Aviador".to_string(),
                category: ProductCategory::Sunglasses,
                brand: "Ray-Ban".to_string(),
                cost_price: Some(Money::from_cents(20000)),
                sale_price: Money::from_cents(54990),
                stock,
            },
        }
    }

    #[test]
    fn test_product_wire_format() {
        let json = r#"{
            "_id": "p1",
            "codigo": "RB3025",
            "nome": "Aviador",
            "tipo": "Óculos de Sol",
            "marca": "Ray-Ban",
            "precoVenda": 549.9,
            "estoque": 4
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();

        assert_eq!(p.data.category, ProductCategory::Sunglasses);
        assert_eq!(p.sale_price().cents(), 54990);
        assert!(p.data.cost_price.is_none());

        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["tipo"], "Óculos de Sol");
        assert_eq!(back["_id"], "p1");
    }

    #[test]
    fn test_null_or_absent_brand_is_empty() {
        let json = r#"{ "_id": "p1", "codigo": "X", "nome": "x", "tipo": "Outro",
                        "marca": null, "precoVenda": 1, "estoque": 0 }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.data.brand, "");

        let json = r#"{ "_id": "p2", "codigo": "Y", "nome": "y", "tipo": "Outro",
                        "precoVenda": 1, "estoque": 0 }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.data.brand, "");
    }

    #[test]
    fn test_matches_code_case_insensitive() {
        let p = product("RB3025", 1);
        assert!(p.matches_code("rb3025"));
        assert!(p.matches_code("RB3025"));
        assert!(!p.matches_code("RB3026"));
    }

    #[test]
    fn test_low_stock_is_strict() {
        assert!(product("A", 2).is_low_stock(3));
        assert!(!product("A", 3).is_low_stock(3));
    }

    #[test]
    fn test_unit_margin() {
        assert_eq!(product("A", 1).unit_margin(), Some(Money::from_cents(34990)));
    }

    #[test]
    fn test_category_labels_round_trip_through_serde() {
        for category in ProductCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.label()));
        }
    }
}
