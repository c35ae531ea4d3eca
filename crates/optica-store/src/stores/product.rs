//! Product store: `/api/products`, plus lookup by SKU code.

use optica_core::{Product, ProductInput};
use std::ops::Deref;
use std::sync::Arc;

use super::EntityStore;
use crate::config::WritePolicy;
use crate::gateway::Resource;
use crate::notify::Notifier;
use crate::transport::Transport;

pub struct Products;

impl Resource for Products {
    const PATH: &'static str = "/api/products";
    const NOUN: &'static str = "product";
    const PLURAL: &'static str = "products";
    type Entity = Product;
    type Create = ProductInput;

    fn id(entity: &Product) -> &str {
        &entity.id
    }
}

/// Catalog products, newest first.
///
/// Stock is never touched locally; selling a product does not decrement it
/// here.
pub struct ProductStore {
    inner: EntityStore<Products>,
}

impl ProductStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        policy: WritePolicy,
    ) -> Self {
        ProductStore {
            inner: EntityStore::new(transport, notifier, policy),
        }
    }

    /// Exact SKU match, case-insensitive.
    pub fn get_by_codigo(&self, code: &str) -> Option<Product> {
        self.inner.find(|p| p.matches_code(code))
    }

    /// Products with stock strictly below `threshold`.
    pub fn low_stock(&self, threshold: i64) -> Vec<Product> {
        self.inner.with_items(|items| {
            items
                .iter()
                .filter(|p| p.is_low_stock(threshold))
                .cloned()
                .collect()
        })
    }
}

impl Deref for ProductStore {
    type Target = EntityStore<Products>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::fixtures::Harness;
    use optica_core::{Money, ProductCategory};
    use serde_json::json;

    fn product_json(id: &str, code: &str, stock: i64) -> serde_json::Value {
        json!({
            "_id": id,
            "codigo": code,
            "nome": "Armação",
            "tipo": "Óculos de Grau",
            "marca": "Tecnol",
            "precoVenda": 320.0,
            "estoque": stock
        })
    }

    async fn store(h: &Harness) -> ProductStore {
        h.transport.reply(
            200,
            json!([
                product_json("p1", "RB3025", 0),
                product_json("p2", "TN-100", 2),
                product_json("p3", "LC.01", 3),
                product_json("p4", "ACC_9", 10)
            ]),
        );
        let store = ProductStore::new(h.transport(), h.notifier(), WritePolicy::default());
        store.load_initial().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_get_by_codigo_is_case_insensitive() {
        let h = Harness::new();
        let store = store(&h).await;

        assert_eq!(store.get_by_codigo("rb3025").unwrap().id, "p1");
        assert_eq!(store.get_by_codigo("tn-100").unwrap().id, "p2");
        assert!(store.get_by_codigo("RB30").is_none());
    }

    #[tokio::test]
    async fn test_low_stock_below_threshold() {
        let h = Harness::new();
        let store = store(&h).await;

        let ids: Vec<String> = store.low_stock(3).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_add_product_prepends() {
        let h = Harness::new();
        let store = store(&h).await;
        h.transport.reply(201, product_json("p5", "NEW-1", 5));

        let input = ProductInput {
            code: "NEW-1".into(),
            name: "Armação".into(),
            category: ProductCategory::Frame,
            brand: "Tecnol".into(),
            cost_price: None,
            sale_price: Money::from_cents(32000),
            stock: 5,
        };
        store.add(&input).await.unwrap();

        assert_eq!(store.snapshot()[0].id, "p5");
        assert_eq!(store.len(), 5);
        let body = h.transport.requests().pop().unwrap().body.unwrap();
        assert_eq!(body["precoVenda"], json!(320));
        assert!(body.get("_id").is_none());
    }
}
