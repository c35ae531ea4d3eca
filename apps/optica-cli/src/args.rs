use clap::{Parser, Subcommand, ValueEnum};
use optica_core::{AppointmentStatus, Money, PaymentCondition, PaymentMethod};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "optica", version, about = "Optical shop data from the command line")]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Today's and this month's figures, upcoming appointments, low stock
    Dashboard,
    /// Revenue per month and the day-by-day comparison with last year
    Report,
    Clients {
        /// Filter by name or phone
        #[arg(short, long)]
        search: Option<String>,
    },
    Products {
        /// Only products below the low-stock threshold
        #[arg(long)]
        low_stock: bool,
    },
    Appointments {
        /// Only the ones linked to this client id
        #[arg(long)]
        client: Option<String>,
    },
    Sales {
        #[arg(long)]
        client: Option<String>,
    },
    FindClient {
        #[arg(long)]
        cpf: String,
    },
    FindProduct {
        #[arg(long)]
        codigo: String,
    },
    /// Sets an appointment's status (wire label or English name)
    AppointmentStatus {
        id: String,
        #[arg(value_parser = parse_status)]
        status: AppointmentStatus,
    },
    /// Records whether an appointment ended in a purchase
    Purchase {
        id: String,
        #[arg(value_parser = parse_yes_no)]
        made_purchase: bool,
    },
    /// Sets a sale's service-order status
    OsStatus { sale_id: String, status: String },
    /// Registers a sale from product codes
    Sell(SellArgs),
    CancelSale { id: String },
    DeleteClient { id: String },
    DeleteProduct { id: String },
    DeleteAppointment { id: String },
}

#[derive(clap::Args)]
pub struct SellArgs {
    /// Client CPF (punctuation optional)
    #[arg(long)]
    pub cpf: String,

    /// `CODE` or `CODE:QTY`, repeatable
    #[arg(long = "item", required = true, value_parser = parse_item)]
    pub items: Vec<(String, u32)>,

    #[arg(long, value_enum, default_value_t = MethodArg::Pix)]
    pub method: MethodArg,

    #[arg(long, value_enum, default_value_t = ConditionArg::Upfront)]
    pub condition: ConditionArg,

    #[arg(long, default_value_t = 1)]
    pub installments: u32,

    /// Down payment in reais ("50,00"); defaults to the full total
    #[arg(long, value_parser = parse_money)]
    pub down: Option<Money>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Cash,
    Pix,
    Debit,
    Credit,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Cash => PaymentMethod::Cash,
            MethodArg::Pix => PaymentMethod::Pix,
            MethodArg::Debit => PaymentMethod::DebitCard,
            MethodArg::Credit => PaymentMethod::CreditCard,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ConditionArg {
    Upfront,
    Installment,
}

impl From<ConditionArg> for PaymentCondition {
    fn from(arg: ConditionArg) -> Self {
        match arg {
            ConditionArg::Upfront => PaymentCondition::Upfront,
            ConditionArg::Installment => PaymentCondition::Installment,
        }
    }
}

fn parse_status(s: &str) -> Result<AppointmentStatus, String> {
    AppointmentStatus::parse(s).ok_or_else(|| {
        let labels: Vec<&str> = AppointmentStatus::ALL.iter().map(|s| s.label()).collect();
        format!("unknown status '{}', expected one of: {}", s, labels.join(", "))
    })
}

fn parse_yes_no(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "yes" | "y" | "sim" | "true" => Ok(true),
        "no" | "n" | "nao" | "não" | "false" => Ok(false),
        other => Err(format!("expected yes or no, got '{}'", other)),
    }
}

fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse_decimal(s).map_err(|e| e.to_string())
}

fn parse_item(s: &str) -> Result<(String, u32), String> {
    match s.split_once(':') {
        None => Ok((s.to_string(), 1)),
        Some((code, qty)) => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("invalid quantity in '{}'", s))?;
            Ok((code.to_string(), qty))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("RB3025").unwrap(), ("RB3025".to_string(), 1));
        assert_eq!(parse_item("LC.01:3").unwrap(), ("LC.01".to_string(), 3));
        assert!(parse_item("LC.01:x").is_err());
    }

    #[test]
    fn test_parse_status_accepts_labels_and_lists_them_on_error() {
        assert_eq!(parse_status("Confirmado").unwrap(), AppointmentStatus::parse("Confirmado").unwrap());
        let err = parse_status("Adiado").unwrap_err();
        assert!(err.contains("Adiado"));
        assert!(err.contains("Concluído"));
    }

    #[test]
    fn test_parse_money_and_method() {
        assert_eq!(parse_money("1234,56").unwrap(), Money::from_cents(123456));
        assert!(parse_money("abc").is_err());
        assert_eq!(PaymentMethod::from(MethodArg::Debit), PaymentMethod::DebitCard);
    }

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("Sim").unwrap());
        assert!(!parse_yes_no("no").unwrap());
        assert!(parse_yes_no("maybe").is_err());
    }

    #[test]
    fn test_cli_parses_sell() {
        let cli = Cli::try_parse_from([
            "optica", "sell", "--cpf", "123.456.789-00", "--item", "RB3025:2", "--item", "LC.01",
            "--method", "credit", "--condition", "installment", "--installments", "3", "--down", "50,00",
        ])
        .unwrap();

        match cli.command {
            Command::Sell(args) => {
                assert_eq!(args.items.len(), 2);
                assert_eq!(args.installments, 3);
                assert_eq!(args.down, Some(Money::from_cents(5000)));
            }
            _ => panic!("expected sell"),
        }
    }

    #[test]
    fn test_cli_parses_status_label() {
        let cli = Cli::try_parse_from(["optica", "appointment-status", "a1", "Concluído"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::AppointmentStatus { status: AppointmentStatus::Completed, .. }
        ));
    }
}
