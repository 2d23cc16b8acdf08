//! FeeDesk CLI
//!
//! Operator tool for the fee system's currency core: list currencies and
//! rates, convert, format and parse amounts, and run simulated fee payments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedesk_common::{amount_from_f64, CurrencyCode, LookupMode, Money};

mod config;
mod context;
mod converter;
mod metrics;
mod payment;

use config::DeskConfig;
use context::DeskContext;
use converter::ConverterSession;
use payment::{PaymentMethod, PaymentOutcome, PaymentProcessor, PaymentRequest, SimulatedGateway};

/// FeeDesk currency and payment CLI
#[derive(Parser, Debug)]
#[command(name = "feedesk")]
#[command(about = "Currency conversion, formatting and simulated fee payments")]
struct Args {
    /// Unknown code handling: strict or lenient
    #[arg(long, global = true)]
    mode: Option<LookupMode>,

    /// Fallback currency for lenient mode
    #[arg(long, global = true)]
    default_currency: Option<String>,

    /// JSON file with exchange rates
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// JSON file with currency definitions
    #[arg(long, global = true)]
    currencies: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List supported currencies
    Currencies,
    /// List exchange rates
    Rates,
    /// Convert an amount between currencies
    Convert {
        #[arg(allow_hyphen_values = true)]
        amount: f64,
        from: String,
        to: String,
    },
    /// Format an amount for display
    Format {
        #[arg(allow_hyphen_values = true)]
        amount: f64,
        code: String,
    },
    /// Parse a formatted amount
    Parse {
        #[arg(allow_hyphen_values = true)]
        text: String,
        code: String,
        /// Fail instead of returning zero on unparseable text
        #[arg(long)]
        strict_parse: bool,
    },
    /// Convert, swap the direction and convert back
    Swap {
        #[arg(allow_hyphen_values = true)]
        amount: f64,
        from: String,
        to: String,
    },
    /// Process a simulated fee payment
    Pay {
        amount: Decimal,
        /// bkash, nagad, rocket, upay, credit-card, debit-card or bank-transfer
        #[arg(long)]
        method: PaymentMethod,
        #[arg(long)]
        student: String,
        #[arg(long, default_value = "Tuition Fee")]
        fee_type: String,
        #[arg(long, default_value = "BDT")]
        currency: String,
        /// Random seed for reproducible outcomes
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Refresh rates on an interval
    Watch {
        /// Number of refresh intervals to run
        #[arg(long, default_value = "3")]
        ticks: u32,
        /// Override the refresh interval in seconds
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = DeskConfig::from_env();
    if let Some(mode) = args.mode {
        config.currency.mode = mode;
    }
    if let Some(code) = &args.default_currency {
        config.currency.default_currency = CurrencyCode::new(code.as_str());
    }
    if let Some(path) = &args.rates {
        config.rates_file = Some(path.clone());
    }
    if let Some(path) = &args.currencies {
        config.currencies_file = Some(path.clone());
    }

    init_logging(config.log_json);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let context = DeskContext::load(config).await?;
    run(&context, args.command, args.json).await
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(context: &DeskContext, command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::Currencies => {
            let default = context.registry.default_code();
            for definition in context.registry.iter() {
                let marker = if &definition.code == default { " (default)" } else { "" };
                println!(
                    "{} {} {}{}",
                    definition.code, definition.symbol, definition.name, marker
                );
            }
        }
        Command::Rates => {
            let snapshot = context.table.snapshot();
            if json {
                let rates: Vec<_> = snapshot.iter().collect();
                println!("{}", serde_json::to_string_pretty(&rates)?);
            } else {
                for rate in snapshot.iter() {
                    println!("{}  (updated {})", rate, rate.last_updated.to_rfc3339());
                }
            }
        }
        Command::Convert { amount, from, to } => {
            let amount = amount_from_f64(amount)?;
            let result = context.service.convert_detailed(amount, &from, &to)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} = {}",
                    context.formatter.format(result.amount, &from)?,
                    context.formatter.format(result.converted_amount, &to)?
                );
            }
        }
        Command::Format { amount, code } => {
            println!("{}", context.formatter.format_f64(amount, &code)?);
        }
        Command::Parse {
            text,
            code,
            strict_parse,
        } => {
            let value = if strict_parse {
                context.formatter.try_parse(&text, &code)?
            } else {
                context.formatter.parse(&text, &code)?
            };
            println!("{}", value);
        }
        Command::Swap { amount, from, to } => {
            let mut session = ConverterSession::new(
                context.service.clone(),
                CurrencyCode::new(from),
                CurrencyCode::new(to),
            );
            session.set_amount(amount_from_f64(amount)?);

            session.convert()?;
            println!(
                "{}  [{}]",
                session.display_converted(&context.formatter)?,
                session.rate_label().unwrap_or_default()
            );

            session.swap()?;
            info!(amount = %session.amount(), from = %session.from(), "Converted back");
            if json {
                println!("{}", serde_json::to_string_pretty(&session.last())?);
            } else {
                println!(
                    "{}  [{}]",
                    session.display_converted(&context.formatter)?,
                    session.rate_label().unwrap_or_default()
                );
            }
        }
        Command::Pay {
            amount,
            method,
            student,
            fee_type,
            currency,
            seed,
        } => {
            let gateway = SimulatedGateway::new(
                context.config.payment.clone(),
                context.formatter.clone(),
                seed,
            );
            let request = PaymentRequest::new(
                Money::new(amount, CurrencyCode::new(currency)),
                student,
                fee_type,
                method,
            );

            info!(
                method = method.display_name(),
                mobile_wallet = method.is_mobile_wallet(),
                "Processing payment"
            );
            let outcome = gateway.process(request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match &outcome {
                    PaymentOutcome::Completed(receipt) => println!(
                        "Paid {} via {} for {} ({}), transaction {}",
                        receipt.formatted_amount,
                        receipt.method.display_name(),
                        receipt.student_name,
                        receipt.fee_type,
                        receipt.transaction_id
                    ),
                    PaymentOutcome::Declined { method, reason } => {
                        println!("Declined via {}: {}", method.display_name(), reason)
                    }
                }
            }

            let metrics = gateway.metrics();
            for (method, stats) in metrics.method_stats() {
                info!(
                    method = %method,
                    attempts = stats.attempts,
                    collected = %stats.collected,
                    "Method totals"
                );
            }
            info!(
                total = metrics.total_payments,
                success_rate = metrics.success_rate(),
                "Payment session complete"
            );
        }
        Command::Watch {
            ticks,
            interval_secs,
        } => {
            let interval = interval_secs
                .map(Duration::from_secs)
                .unwrap_or(context.config.refresh_interval);

            info!(ticks, interval_secs = interval.as_secs(), "Watching exchange rates");

            let handle = context.refresher().spawn();
            tokio::time::sleep(interval * ticks).await;
            handle.abort();

            info!(version = context.table.version(), "Rate watch finished");
        }
    }

    Ok(())
}
