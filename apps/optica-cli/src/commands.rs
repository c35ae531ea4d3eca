//! Command dispatch: each command loads what it reads, calls one store
//! operation or view, and prints the result.

use anyhow::{anyhow, bail, Context};
use chrono::Local;
use optica_core::{Appointment, PaymentMethod, SaleDraft, SaleStatus};
use optica_store::{AppState, LoadReport, StoreResult};
use tracing::{info, warn};

use crate::args::{Command, SellArgs};
use crate::output::{self, Output};

pub async fn run(state: &AppState, command: Command, json: bool) -> anyhow::Result<()> {
    let out = Output::new(json);

    match command {
        Command::Dashboard => {
            warn_partial(&state.refresh_all().await);
            let summary = state.dashboard(&Local::now());
            out.show(&summary, || {
                output::dashboard_lines(&summary, |a| display_name(state, a))
            })
        }
        Command::Report => {
            state.sales.refresh().await?;
            let now = Local::now();
            let history = state.revenue_history(&now);
            let daily = state.daily_comparison(&now);
            out.show(&serde_json::json!({ "history": &history, "daily": &daily }), || {
                output::report_lines(&history, &daily)
            })
        }
        Command::Clients { search } => {
            state.clients.refresh().await?;
            let clients = match search {
                Some(query) => state.clients.search(&query),
                None => state.clients.snapshot(),
            };
            out.show(&clients, || clients.iter().map(output::client_line).collect())
        }
        Command::Products { low_stock } => {
            state.products.refresh().await?;
            let products = if low_stock {
                state.products.low_stock(state.config().stores.low_stock_threshold)
            } else {
                state.products.snapshot()
            };
            out.show(&products, || products.iter().map(output::product_line).collect())
        }
        Command::Appointments { client } => {
            let (clients, appointments) =
                tokio::join!(state.clients.refresh(), state.appointments.refresh());
            // Names are cosmetic; the listing still works without clients.
            if let Err(err) = clients {
                warn!(error = %err, "Showing appointments without client names");
            }
            appointments?;

            let list = match client {
                Some(id) => state.appointments.for_client(&id),
                None => state.appointments.snapshot(),
            };
            out.show(&list, || {
                list.iter()
                    .map(|a| output::appointment_line(a, &display_name(state, a)))
                    .collect()
            })
        }
        Command::Sales { client } => {
            state.sales.refresh().await?;
            let sales = match client {
                Some(id) => state.sales.for_client(&id),
                None => state.sales.snapshot(),
            };
            out.show(&sales, || sales.iter().map(output::sale_line).collect())
        }
        Command::FindClient { cpf } => {
            state.clients.refresh().await?;
            let client = state
                .clients
                .get_by_cpf(&cpf)
                .ok_or_else(|| anyhow!("no client with CPF {}", cpf))?;
            out.show(&client, || vec![output::client_line(&client)])
        }
        Command::FindProduct { codigo } => {
            state.products.refresh().await?;
            let product = state
                .products
                .get_by_codigo(&codigo)
                .ok_or_else(|| anyhow!("no product with code {}", codigo))?;
            out.show(&product, || vec![output::product_line(&product)])
        }
        Command::AppointmentStatus { id, status } => {
            state.appointments.refresh().await?;
            let updated = state.appointments.set_status(&id, status).await?;
            out.show(&updated, || vec![output::appointment_line(&updated, &display_name(state, &updated))])
        }
        Command::Purchase { id, made_purchase } => {
            state.appointments.refresh().await?;
            let updated = state.appointments.set_made_purchase(&id, made_purchase).await?;
            out.show(&updated, || vec![output::appointment_line(&updated, &display_name(state, &updated))])
        }
        Command::OsStatus { sale_id, status } => {
            state.sales.refresh().await?;
            if state.sales.get(&sale_id).is_none() {
                bail!("no sale with id {}", sale_id);
            }
            state.sales.update_service_order_status(&sale_id, &status).await?;
            let sale = state
                .sales
                .get(&sale_id)
                .ok_or_else(|| anyhow!("sale {} disappeared", sale_id))?;
            out.show(&sale, || vec![output::sale_line(&sale)])
        }
        Command::Sell(args) => {
            let sale = sell(state, args).await?;
            out.show(&sale, || vec![output::sale_line(&sale)])
        }
        Command::CancelSale { id } => {
            state.sales.cancel(&id).await?;
            out.done(&format!("Sale {} cancelled", id));
            Ok(())
        }
        Command::DeleteClient { id } => {
            deleted(out, "Client", &id, state.clients.delete(&id).await)
        }
        Command::DeleteProduct { id } => {
            deleted(out, "Product", &id, state.products.delete(&id).await)
        }
        Command::DeleteAppointment { id } => {
            deleted(out, "Appointment", &id, state.appointments.delete(&id).await)
        }
    }
}

/// Builds a sale from product codes and submits it.
///
/// Unit prices are taken from the catalog as loaded right now.
async fn sell(state: &AppState, args: SellArgs) -> anyhow::Result<optica_core::Sale> {
    let (clients, products) = tokio::join!(state.clients.refresh(), state.products.refresh());
    clients?;
    products?;

    let client = state
        .clients
        .get_by_cpf(&args.cpf)
        .ok_or_else(|| anyhow!("no client with CPF {}", args.cpf))?;

    let mut draft = SaleDraft::new();
    for (code, quantity) in &args.items {
        let product = state
            .products
            .get_by_codigo(code)
            .ok_or_else(|| anyhow!("no product with code {}", code))?;
        draft
            .add_product(&product, *quantity)
            .with_context(|| format!("adding {}", code))?;
    }

    let method: PaymentMethod = args.method.into();
    let down = args.down.unwrap_or_else(|| draft.total());
    let payment = draft.payment(method, args.condition.into(), args.installments, down)?;
    let input = draft.into_input(&client.id, SaleStatus::Completed, payment)?;

    info!(client = %client.id, total = %input.total, lines = input.items.len(), "Submitting sale");
    Ok(state.sales.add(&input).await?)
}

fn deleted(out: Output, noun: &str, id: &str, result: StoreResult<()>) -> anyhow::Result<()> {
    result?;
    out.done(&format!("{} {} deleted", noun, id));
    Ok(())
}

fn display_name(state: &AppState, appointment: &Appointment) -> String {
    state
        .clients
        .display_name(&appointment.subject)
        .unwrap_or_else(|| "(unknown client)".to_string())
}

fn warn_partial(report: &LoadReport) {
    for (name, err) in report.failures() {
        warn!(collection = name, error = %err, "Showing figures without {}", name);
    }
}
