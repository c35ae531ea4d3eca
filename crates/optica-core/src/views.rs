//! # Derived Views
//!
//! Pure computations over store snapshots, recomputed on every read.
//!
//! ## Local Time
//! Every function takes the current instant as `&DateTime<Tz>`. "Today" and
//! "this month" are evaluated in that instant's time zone, so passing
//! `chrono::Local::now()` gives device-local semantics and tests can pin a
//! fixed offset.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  sales ────────► revenue_today / revenue_month               │
//! │        ────────► monthly_revenue_history (reports)           │
//! │        ────────► daily_comparison        (reports)           │
//! │  appointments ─► upcoming_appointments                       │
//! │  products ─────► low_stock_count                             │
//! │                                                              │
//! │  all of the above ──► DashboardSummary::compute              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dashboard revenue counts every sale regardless of status; the report
//! views leave cancelled sales out.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::appointment::Appointment;
use crate::client::Client;
use crate::money::Money;
use crate::product::Product;
use crate::sale::Sale;
use crate::UPCOMING_DISPLAY_COUNT;

/// Days in the per-day comparison buckets.
pub const DAYS_IN_COMPARISON: usize = 31;

fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, now: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&now.timezone()).date_naive()
}

// =============================================================================
// Revenue
// =============================================================================

/// Sales whose `dataVenda` falls on `now`'s calendar day.
pub fn sales_today<'a, Tz: TimeZone>(sales: &'a [Sale], now: &DateTime<Tz>) -> Vec<&'a Sale> {
    let today = now.date_naive();
    sales
        .iter()
        .filter(|s| local_date(&s.sold_at, now) == today)
        .collect()
}

/// Number of sales made today.
pub fn sales_today_count<Tz: TimeZone>(sales: &[Sale], now: &DateTime<Tz>) -> usize {
    sales_today(sales, now).len()
}

/// Sum of `valorTotal` over today's sales.
pub fn revenue_today<Tz: TimeZone>(sales: &[Sale], now: &DateTime<Tz>) -> Money {
    sales_today(sales, now).into_iter().map(|s| s.total).sum()
}

/// Sum of `valorTotal` over sales in `now`'s calendar month and year.
pub fn revenue_month<Tz: TimeZone>(sales: &[Sale], now: &DateTime<Tz>) -> Money {
    let today = now.date_naive();
    sales
        .iter()
        .filter(|s| {
            let d = local_date(&s.sold_at, now);
            d.year() == today.year() && d.month() == today.month()
        })
        .map(|s| s.total)
        .sum()
}

// =============================================================================
// Appointments & Stock
// =============================================================================

/// Open appointments (Scheduled/Confirmed) dated today or later, earliest
/// first. Everything from midnight today counts, even if the hour passed.
pub fn open_appointments<'a, Tz: TimeZone>(
    appointments: &'a [Appointment],
    now: &DateTime<Tz>,
) -> Vec<&'a Appointment> {
    let today = now.date_naive();
    let mut open: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.status.is_open() && local_date(&a.date, now) >= today)
        .collect();
    open.sort_by_key(|a| a.date);
    open
}

/// The first `limit` entries of [`open_appointments`].
pub fn upcoming_appointments<'a, Tz: TimeZone>(
    appointments: &'a [Appointment],
    now: &DateTime<Tz>,
    limit: usize,
) -> Vec<&'a Appointment> {
    let mut open = open_appointments(appointments, now);
    open.truncate(limit);
    open
}

/// Products whose stock is strictly below `threshold`.
pub fn low_stock_count(products: &[Product], threshold: i64) -> usize {
    products.iter().filter(|p| p.is_low_stock(threshold)).count()
}

// =============================================================================
// Reports
// =============================================================================

/// Revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// `MM/YY`
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub total: Money,
}

/// Non-cancelled revenue grouped by month, oldest first, keeping only the
/// last `months` months that had sales.
pub fn monthly_revenue_history<Tz: TimeZone>(
    sales: &[Sale],
    now: &DateTime<Tz>,
    months: usize,
) -> Vec<MonthlyRevenue> {
    let mut buckets: BTreeMap<(i32, u32), Money> = BTreeMap::new();
    for sale in sales.iter().filter(|s| !s.is_cancelled()) {
        let d = local_date(&sale.sold_at, now);
        *buckets.entry((d.year(), d.month())).or_default() += sale.total;
    }

    let skip = buckets.len().saturating_sub(months);
    buckets
        .into_iter()
        .skip(skip)
        .map(|((year, month), total)| MonthlyRevenue {
            label: format!("{:02}/{:02}", month, year.rem_euclid(100)),
            year,
            month,
            total,
        })
        .collect()
}

/// Per-day revenue for `now`'s month, this year against last year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyComparison {
    pub month: u32,
    pub current_year: i32,
    /// Index 0 is day 1.
    pub current: Vec<Money>,
    pub previous: Vec<Money>,
}

/// Buckets non-cancelled sales of `now`'s month by day of month, for the
/// current and the previous year.
pub fn daily_comparison<Tz: TimeZone>(sales: &[Sale], now: &DateTime<Tz>) -> DailyComparison {
    let today = now.date_naive();
    let mut current = vec![Money::zero(); DAYS_IN_COMPARISON];
    let mut previous = vec![Money::zero(); DAYS_IN_COMPARISON];

    for sale in sales.iter().filter(|s| !s.is_cancelled()) {
        let d = local_date(&sale.sold_at, now);
        if d.month() != today.month() {
            continue;
        }
        let day = d.day0() as usize;
        if d.year() == today.year() {
            current[day] += sale.total;
        } else if d.year() == today.year() - 1 {
            previous[day] += sale.total;
        }
    }

    DailyComparison {
        month: today.month(),
        current_year: today.year(),
        current,
        previous,
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the dashboard screen shows, computed in one pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub revenue_today: Money,
    pub revenue_month: Money,
    pub sales_today: usize,
    pub client_count: usize,
    pub product_count: usize,
    /// All open appointments from today on.
    pub pending_appointments: usize,
    /// The next few, earliest first.
    pub upcoming: Vec<Appointment>,
    pub low_stock: usize,
}

impl DashboardSummary {
    /// Computes the summary with the default display count.
    pub fn compute<Tz: TimeZone>(
        clients: &[Client],
        products: &[Product],
        appointments: &[Appointment],
        sales: &[Sale],
        now: &DateTime<Tz>,
        low_stock_threshold: i64,
    ) -> Self {
        let open = open_appointments(appointments, now);
        DashboardSummary {
            revenue_today: revenue_today(sales, now),
            revenue_month: revenue_month(sales, now),
            sales_today: sales_today_count(sales, now),
            client_count: clients.len(),
            product_count: products.len(),
            pending_appointments: open.len(),
            upcoming: open
                .into_iter()
                .take(UPCOMING_DISPLAY_COUNT)
                .cloned()
                .collect(),
            low_stock: low_stock_count(products, low_stock_threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::{AppointmentKind, AppointmentStatus, AppointmentSubject};
    use crate::product::{ProductCategory, ProductInput};
    use crate::sale::{ClientRef, Payment, PaymentCondition, PaymentMethod, SaleStatus};
    use crate::LOW_STOCK_THRESHOLD;
    use chrono::{Duration, FixedOffset};

    /// 2026-10-16 15:00 at UTC-03:00.
    fn now() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 16, 15, 0, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sale(id: &str, cents: i64, sold_at: DateTime<Utc>, status: SaleStatus) -> Sale {
        let total = Money::from_cents(cents);
        Sale {
            id: id.to_string(),
            client: ClientRef::Unresolved("c1".into()),
            items: Vec::new(),
            total,
            sold_at,
            status,
            payment: Payment::new(total, total, PaymentMethod::Pix, PaymentCondition::Upfront, 1),
            service_order: None,
        }
    }

    fn appointment(id: &str, date: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.to_string(),
            subject: AppointmentSubject::LinkedClient("c1".into()),
            kind: AppointmentKind::EyeExam,
            date,
            observation: None,
            status,
            made_purchase: false,
        }
    }

    fn product(stock: i64) -> Product {
        Product {
            id: format!("p{}", stock),
            data: ProductInput {
                code: format!("C{}", stock),
                name: "Armação".into(),
                category: ProductCategory::Frame,
                brand: String::new(),
                cost_price: None,
                sale_price: Money::from_cents(1000),
                stock,
            },
        }
    }

    #[test]
    fn test_revenue_today_excludes_other_days() {
        let sales = vec![
            sale("a", 10000, at(2026, 10, 16, 9), SaleStatus::Completed),
            sale("b", 5000, at(2026, 10, 16, 11), SaleStatus::Completed),
            sale("c", 2550, at(2026, 10, 16, 14), SaleStatus::Pending),
            sale("d", 99900, at(2026, 9, 16, 10), SaleStatus::Completed),
        ];

        assert_eq!(revenue_today(&sales, &now()), Money::from_cents(17550));
        assert_eq!(sales_today_count(&sales, &now()), 3);
        assert_eq!(revenue_month(&sales, &now()), Money::from_cents(17550));
    }

    #[test]
    fn test_day_boundary_follows_caller_zone() {
        // 01:00 UTC on the 17th is still the 16th at UTC-03:00.
        let late = Utc.with_ymd_and_hms(2026, 10, 17, 1, 0, 0).unwrap();
        let sales = vec![sale("a", 1000, late, SaleStatus::Completed)];

        assert_eq!(revenue_today(&sales, &now()), Money::from_cents(1000));
        assert_eq!(revenue_today(&sales, &now().with_timezone(&Utc)), Money::zero());
    }

    #[test]
    fn test_revenue_month_matches_year_too() {
        let sales = vec![
            sale("a", 1000, at(2026, 10, 1, 9), SaleStatus::Completed),
            sale("b", 2000, at(2025, 10, 1, 9), SaleStatus::Completed),
        ];
        assert_eq!(revenue_month(&sales, &now()), Money::from_cents(1000));
    }

    #[test]
    fn test_upcoming_appointments_ordering() {
        let n = now().with_timezone(&Utc);
        let appts = vec![
            appointment("in3", n + Duration::days(3), AppointmentStatus::Confirmed),
            appointment("tomorrow", n + Duration::days(1), AppointmentStatus::Scheduled),
            appointment("yesterday", n - Duration::days(1), AppointmentStatus::Scheduled),
            appointment("cancelled", n + Duration::days(1), AppointmentStatus::Cancelled),
        ];

        let ids: Vec<&str> = upcoming_appointments(&appts, &now(), 3)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["tomorrow", "in3"]);
    }

    #[test]
    fn test_upcoming_includes_earlier_today_and_truncates() {
        let appts = vec![
            appointment("morning", at(2026, 10, 16, 8), AppointmentStatus::Scheduled),
            appointment("a", at(2026, 10, 17, 8), AppointmentStatus::Scheduled),
            appointment("b", at(2026, 10, 18, 8), AppointmentStatus::Scheduled),
            appointment("c", at(2026, 10, 19, 8), AppointmentStatus::Scheduled),
        ];

        let upcoming = upcoming_appointments(&appts, &now(), UPCOMING_DISPLAY_COUNT);
        assert_eq!(upcoming.len(), 3);
        assert_eq!(upcoming[0].id, "morning");
        assert_eq!(open_appointments(&appts, &now()).len(), 4);
    }

    #[test]
    fn test_low_stock_count() {
        let products = vec![product(0), product(2), product(3), product(10)];
        assert_eq!(low_stock_count(&products, 3), 2);
    }

    #[test]
    fn test_monthly_history_skips_cancelled_and_keeps_last_months() {
        let mut sales = Vec::new();
        for m in 1..=8 {
            sales.push(sale(&format!("s{}", m), 10000, at(2026, m, 5, 10), SaleStatus::Completed));
        }
        sales.push(sale("x", 50000, at(2026, 8, 6, 10), SaleStatus::Cancelled));
        sales.push(sale("y", 2550, at(2026, 8, 7, 10), SaleStatus::Pending));

        let history = monthly_revenue_history(&sales, &now(), 6);

        assert_eq!(history.len(), 6);
        assert_eq!(history[0].label, "03/26");
        assert_eq!(history[5].label, "08/26");
        assert_eq!(history[5].total, Money::from_cents(12550));
    }

    #[test]
    fn test_monthly_history_orders_across_years() {
        let sales = vec![
            sale("b", 100, at(2026, 1, 5, 10), SaleStatus::Completed),
            sale("a", 100, at(2025, 12, 5, 10), SaleStatus::Completed),
        ];
        let labels: Vec<String> = monthly_revenue_history(&sales, &now(), 6)
            .into_iter()
            .map(|m| m.label)
            .collect();
        assert_eq!(labels, vec!["12/25", "01/26"]);
    }

    #[test]
    fn test_daily_comparison() {
        let sales = vec![
            sale("a", 1000, at(2026, 10, 1, 10), SaleStatus::Completed),
            sale("b", 500, at(2026, 10, 1, 12), SaleStatus::Completed),
            sale("c", 700, at(2025, 10, 31, 10), SaleStatus::Completed),
            sale("d", 900, at(2026, 10, 2, 10), SaleStatus::Cancelled),
            sale("e", 900, at(2024, 10, 2, 10), SaleStatus::Completed),
            sale("f", 900, at(2026, 9, 2, 10), SaleStatus::Completed),
        ];

        let cmp = daily_comparison(&sales, &now());

        assert_eq!(cmp.current.len(), DAYS_IN_COMPARISON);
        assert_eq!(cmp.current[0], Money::from_cents(1500));
        assert_eq!(cmp.current[1], Money::zero());
        assert_eq!(cmp.previous[30], Money::from_cents(700));
        assert_eq!(cmp.previous[1], Money::zero());
    }

    #[test]
    fn test_dashboard_summary() {
        let n = now().with_timezone(&Utc);
        let sales = vec![sale("a", 10000, n, SaleStatus::Completed)];
        let appts = vec![appointment("a1", n + Duration::hours(2), AppointmentStatus::Scheduled)];
        let products = vec![product(1), product(5)];

        let summary = DashboardSummary::compute(&[], &products, &appts, &sales, &now(), LOW_STOCK_THRESHOLD);

        assert_eq!(summary.revenue_today, Money::from_cents(10000));
        assert_eq!(summary.sales_today, 1);
        assert_eq!(summary.pending_appointments, 1);
        assert_eq!(summary.upcoming[0].id, "a1");
        assert_eq!(summary.low_stock, 1);
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.client_count, 0);
    }
}
