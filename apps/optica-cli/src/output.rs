use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use optica_core::views::{DailyComparison, MonthlyRevenue};
use optica_core::{Appointment, Client, DashboardSummary, Money, Product, Sale};
use serde::Serialize;

/// Text or JSON, chosen once per run.
#[derive(Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Output { json }
    }

    /// Prints `value` as JSON, or each line of `text()` otherwise.
    pub fn show<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> Vec<String>) -> anyhow::Result<()> {
        println!("{}", self.render(value, text)?);
        Ok(())
    }

    pub fn render<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> Vec<String>) -> anyhow::Result<String> {
        if self.json {
            return serde_json::to_string_pretty(value).context("rendering JSON");
        }
        let lines = text();
        if lines.is_empty() {
            return Ok("<none>".to_string());
        }
        Ok(lines.join("\n"))
    }

    pub fn done(&self, message: &str) {
        println!("{}", self.confirmation(message));
    }

    fn confirmation(&self, message: &str) -> String {
        if self.json {
            serde_json::json!({ "ok": true, "message": message }).to_string()
        } else {
            message.to_string()
        }
    }
}

fn local(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

pub fn client_line(c: &Client) -> String {
    let cpf = c.data.cpf.as_deref().unwrap_or("-");
    format!("{:<26} {:<32} {:<18} CPF {}", c.id, c.full_name(), c.phone(), cpf)
}

pub fn product_line(p: &Product) -> String {
    format!(
        "{:<26} {:<12} {:<28} {:<18} {:>12} stock {}",
        p.id,
        p.data.code,
        p.data.name,
        p.data.category.label(),
        p.sale_price().to_string(),
        p.stock()
    )
}

/// `who` is the resolved display name (client lookup or walk-in name).
pub fn appointment_line(a: &Appointment, who: &str) -> String {
    let purchase = if a.made_purchase { " (purchase)" } else { "" };
    format!(
        "{:<26} {} {:<18} {:<16} {}{}",
        a.id,
        local(&a.date),
        a.kind.label(),
        a.status.label(),
        who,
        purchase
    )
}

pub fn sale_line(s: &Sale) -> String {
    let client = s.client.name().or(s.client.id()).unwrap_or("(client removed)");
    let os = s.service_order_status().unwrap_or("-");
    format!(
        "{:<26} {} {:<28} {:>12} {:<10} {} / {}x  OS: {}",
        s.id,
        local(&s.sold_at),
        client,
        s.total.to_string(),
        s.status.label(),
        s.payment.method,
        s.payment.installments,
        os
    )
}

pub fn dashboard_lines(d: &DashboardSummary, who: impl Fn(&Appointment) -> String) -> Vec<String> {
    let mut lines = vec![
        format!("Revenue today      {}", d.revenue_today),
        format!("Revenue this month {}", d.revenue_month),
        format!("Sales today        {}", d.sales_today),
        format!("Clients            {}", d.client_count),
        format!("Products           {}", d.product_count),
        format!("Low stock          {}", d.low_stock),
        format!("Open appointments  {}", d.pending_appointments),
    ];
    for a in &d.upcoming {
        lines.push(format!("  next: {}", appointment_line(a, &who(a))));
    }
    lines
}

pub fn report_lines(history: &[MonthlyRevenue], daily: &DailyComparison) -> Vec<String> {
    let mut lines: Vec<String> = history
        .iter()
        .map(|m| format!("{}  {:>14}", m.label, m.total.to_string()))
        .collect();

    let this_year: Money = daily.current.iter().sum();
    let last_year: Money = daily.previous.iter().sum();
    lines.push(format!(
        "Month {:02}: {} in {}, {} in {}",
        daily.month,
        this_year,
        daily.current_year,
        last_year,
        daily.current_year - 1
    ));
    lines
}
