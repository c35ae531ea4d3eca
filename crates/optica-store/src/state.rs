//! # Application State
//!
//! The one container built at the application root. Screens receive it (or
//! the individual `Arc` stores) explicitly; nothing is reachable globally.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AppState                                       │
//! │                                                                         │
//! │   ApiConfig ──► HttpTransport ──┐        TracingNotifier / screen ──┐   │
//! │                                 ▼                                   ▼   │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────────┐ ┌───────────┐  │
//! │  │ ClientStore  │ │ ProductStore │ │ AppointmentStore │ │ SaleStore │  │
//! │  └──────────────┘ └──────────────┘ └──────────────────┘ └───────────┘  │
//! │          │               │                  │                 │         │
//! │          └───────────────┴────── views ─────┴─────────────────┘         │
//! │                                    │                                    │
//! │                            DashboardSummary                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each store owns its collection. Views borrow all four at once, read only.

use chrono::{DateTime, TimeZone};
use optica_core::views::{self, DailyComparison, MonthlyRevenue};
use optica_core::{DashboardSummary, REVENUE_HISTORY_MONTHS};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{GatewayError, StoreError, StoreResult};
use crate::notify::Notifier;
use crate::stores::{AppointmentStore, ClientStore, ProductStore, SaleStore};
use crate::transport::{HttpTransport, Transport};

/// Outcome of loading all four collections.
///
/// One failed store never cancels the others.
#[derive(Debug)]
pub struct LoadReport {
    pub clients: StoreResult<usize>,
    pub products: StoreResult<usize>,
    pub appointments: StoreResult<usize>,
    pub sales: StoreResult<usize>,
}

impl LoadReport {
    /// True when every store loaded.
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    /// The stores that failed, by collection name.
    pub fn failures(&self) -> Vec<(&'static str, &StoreError)> {
        [
            ("clients", &self.clients),
            ("products", &self.products),
            ("appointments", &self.appointments),
            ("sales", &self.sales),
        ]
        .into_iter()
        .filter_map(|(name, result)| result.as_ref().err().map(|e| (name, e)))
        .collect()
    }
}

/// Every store, sharing one transport and one notifier.
pub struct AppState {
    pub clients: Arc<ClientStore>,
    pub products: Arc<ProductStore>,
    pub appointments: Arc<AppointmentStore>,
    pub sales: Arc<SaleStore>,
    config: ApiConfig,
}

impl AppState {
    /// Wires the stores over an existing transport.
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        let policy = config.stores.write_policy;
        AppState {
            clients: Arc::new(ClientStore::new(transport.clone(), notifier.clone(), policy)),
            products: Arc::new(ProductStore::new(transport.clone(), notifier.clone(), policy)),
            appointments: Arc::new(AppointmentStore::new(transport.clone(), notifier.clone(), policy)),
            sales: Arc::new(SaleStore::new(transport, notifier, policy)),
            config,
        }
    }

    /// Builds the HTTP transport from `config` and wires the stores.
    pub fn from_config(config: ApiConfig, notifier: Arc<dyn Notifier>) -> Result<Self, GatewayError> {
        let transport = HttpTransport::new(&config)?;
        info!(
            base_url = %transport.base_url(),
            write_policy = %config.stores.write_policy,
            "Connecting to shop API"
        );
        Ok(Self::new(config, Arc::new(transport), notifier))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// True while any store is loading.
    pub fn is_loading(&self) -> bool {
        self.clients.is_loading()
            || self.products.is_loading()
            || self.appointments.is_loading()
            || self.sales.is_loading()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Startup load of all four collections, concurrently. Failures are
    /// logged only.
    pub async fn load_initial(&self) -> LoadReport {
        let (clients, products, appointments, sales) = tokio::join!(
            self.clients.load_initial(),
            self.products.load_initial(),
            self.appointments.load_initial(),
            self.sales.load_initial(),
        );
        self.finish(LoadReport {
            clients,
            products,
            appointments,
            sales,
        })
    }

    /// Pull-to-refresh for the dashboard: all four refreshes run together
    /// and all of them finish before this returns.
    pub async fn refresh_all(&self) -> LoadReport {
        let (clients, products, appointments, sales) = tokio::join!(
            self.clients.refresh(),
            self.products.refresh(),
            self.appointments.refresh(),
            self.sales.refresh(),
        );
        self.finish(LoadReport {
            clients,
            products,
            appointments,
            sales,
        })
    }

    fn finish(&self, report: LoadReport) -> LoadReport {
        let failures = report.failures();
        if failures.is_empty() {
            info!("All collections loaded");
        } else {
            let names: Vec<&str> = failures.iter().map(|(name, _)| *name).collect();
            warn!(failed = ?names, "Some collections did not load");
        }
        report
    }

    // =========================================================================
    // Derived Views
    // =========================================================================

    /// Dashboard figures for `now`.
    pub fn dashboard<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DashboardSummary {
        let threshold = self.config.stores.low_stock_threshold;
        self.clients.with_items(|clients| {
            self.products.with_items(|products| {
                self.appointments.with_items(|appointments| {
                    self.sales.with_items(|sales| {
                        DashboardSummary::compute(clients, products, appointments, sales, now, threshold)
                    })
                })
            })
        })
    }

    /// Revenue per month for the last few months, oldest first.
    pub fn revenue_history<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<MonthlyRevenue> {
        self.sales
            .with_items(|sales| views::monthly_revenue_history(sales, now, REVENUE_HISTORY_MONTHS))
    }

    /// This month against the same month last year, day by day.
    pub fn daily_comparison<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DailyComparison {
        self.sales.with_items(|sales| views::daily_comparison(sales, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WritePolicy;
    use crate::stores::fixtures::Harness;
    use crate::transport::Method;
    use chrono::FixedOffset;
    use optica_core::Money;
    use serde_json::json;

    fn state(h: &Harness) -> AppState {
        let mut config = ApiConfig::default();
        config.stores.write_policy = WritePolicy::RejectConcurrent;
        AppState::new(config, h.transport(), h.notifier())
    }

    fn now() -> DateTime<FixedOffset> {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        tz.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap()
    }

    fn sale(id: &str, date: &str, total: f64) -> serde_json::Value {
        json!({
            "_id": id,
            "cliente": "c1",
            "produtos": [],
            "valorTotal": total,
            "dataVenda": date,
            "status": "Concluído",
            "pagamento": {
                "valorEntrada": total,
                "valorRestante": 0,
                "metodoPagamento": "Dinheiro",
                "condicaoPagamento": "À vista"
            }
        })
    }

    /// Replies in start order: clients, products, appointments, sales.
    fn script_all(h: &Harness) {
        h.transport
            .reply(200, json!([{ "_id": "c1", "fullName": "Ana", "phone": "1" }]))
            .reply(
                200,
                json!([
                    { "_id": "p1", "codigo": "A", "nome": "a", "tipo": "Lente", "precoVenda": 10, "estoque": 0 },
                    { "_id": "p2", "codigo": "B", "nome": "b", "tipo": "Lente", "precoVenda": 10, "estoque": 2 },
                    { "_id": "p3", "codigo": "C", "nome": "c", "tipo": "Lente", "precoVenda": 10, "estoque": 3 },
                    { "_id": "p4", "codigo": "D", "nome": "d", "tipo": "Lente", "precoVenda": 10, "estoque": 10 }
                ]),
            )
            .reply(
                200,
                json!([
                    { "_id": "a1", "clientId": "c1", "tipo": "Consulta", "date": "2026-10-17T13:00:00Z", "status": "Marcado" },
                    { "_id": "a2", "clientId": "c1", "tipo": "Consulta", "date": "2026-10-19T13:00:00Z", "status": "Confirmado" },
                    { "_id": "a3", "clientId": "c1", "tipo": "Consulta", "date": "2026-10-15T13:00:00Z", "status": "Marcado" },
                    { "_id": "a4", "clientId": "c1", "tipo": "Consulta", "date": "2026-10-17T14:00:00Z", "status": "Cancelado" }
                ]),
            )
            .reply(
                200,
                json!([
                    sale("s1", "2026-10-16T12:00:00Z", 100.0),
                    sale("s2", "2026-10-16T13:00:00Z", 50.0),
                    sale("s3", "2026-10-16T14:00:00Z", 25.5),
                    sale("s4", "2026-09-10T14:00:00Z", 999.0)
                ]),
            );
    }

    #[tokio::test]
    async fn test_load_initial_then_dashboard() {
        let h = Harness::new();
        let state = state(&h);
        assert!(state.is_loading());
        script_all(&h);

        let report = state.load_initial().await;
        assert!(report.is_complete());
        assert!(!state.is_loading());

        let paths: Vec<String> = h.transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/api/clients", "/api/products", "/api/appointments", "/api/sales"]);

        let summary = state.dashboard(&now());
        assert_eq!(summary.revenue_today, Money::from_cents(17550));
        assert_eq!(summary.sales_today, 3);
        assert_eq!(summary.client_count, 1);
        assert_eq!(summary.product_count, 4);
        assert_eq!(summary.low_stock, 2);
        let upcoming: Vec<&str> = summary.upcoming.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(upcoming, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_refresh_all_survives_one_failure() {
        let h = Harness::new();
        let state = state(&h);
        h.transport
            .reply(200, json!([]))
            .reply(503, json!({ "message": "maintenance" }))
            .reply(200, json!([]))
            .reply(200, json!([sale("s1", "2026-10-16T12:00:00Z", 10.0)]));

        let report = state.refresh_all().await;

        assert!(!report.is_complete());
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "products");
        assert_eq!(state.sales.len(), 1);
        assert!(!state.is_loading());
        // Refresh is a user action, so the failure is surfaced.
        assert_eq!(h.notifier.notices()[0].message, "maintenance");
    }

    #[test]
    fn test_stores_share_the_write_policy() {
        let h = Harness::new();
        let state = state(&h);

        assert_eq!(state.clients.policy(), WritePolicy::RejectConcurrent);
        assert_eq!(state.appointments.policy(), WritePolicy::RejectConcurrent);
    }

    #[tokio::test]
    async fn test_revenue_history_from_sales_store() {
        let h = Harness::new();
        let state = state(&h);
        script_all(&h);
        state.load_initial().await;

        let history = state.revenue_history(&now());
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].label, "09/26");
        assert_eq!(history[0].total, Money::from_cents(99900));
        assert_eq!(history[1].label, "10/26");
        assert_eq!(history[1].total, Money::from_cents(17550));

        let requests = h.transport.requests();
        assert!(requests.iter().all(|r| r.method == Method::Get));
    }
}
