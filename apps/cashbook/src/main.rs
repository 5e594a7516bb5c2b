//! # CashBook
//!
//! Command line cashbook and inventory manager for small shops.
//!
//! ## Startup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CashBook Startup                                 │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize tracing (RUST_LOG, default warn, to stderr)              │
//! │  3. Load StoreConfig: config file, then environment overrides           │
//! │  4. Build the Cashbook client once (degraded when unconfigured)         │
//! │  5. Run one view against stdin/stdout                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! export CASHBOOK_STORE_URL=https://example.supabase.co
//! export CASHBOOK_STORE_ANON_KEY=...
//!
//! cashbook dashboard
//! cashbook sales record --item 1:2 --item 3:1 --payment cash
//! cashbook report sales --from 2026-03-01 --to 2026-03-31 --export ./reports
//! ```

mod cli;
mod error;
mod render;
mod views;

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cashbook_core::{DateRange, NewCustomer, NewProduct, ProductUpdate, ReportFilters};
use cashbook_store::{Cashbook, StoreConfig};

use crate::cli::{Cli, Command, CustomerCommand, ProductCommand, ReportCommand, SaleCommand};
use crate::error::{AppError, AppResult};
use crate::views::{account, customers, dashboard, inventory, reports, sales};

/// Initializes tracing.
///
/// ## Log Levels
/// - `RUST_LOG=info` - Startup and writes
/// - `RUST_LOG=cashbook_store=debug` - Every remote call
/// - Default: WARN level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let config = match cli.config.clone() {
        Some(path) => StoreConfig::load_with(|key| env::var(key).ok(), Some(path)),
        None => StoreConfig::load(),
    }
    .context("Failed to load configuration")?;
    debug!(?config, "Configuration loaded");

    let cashbook = Cashbook::connect(&config).context("Failed to create the store client")?;
    info!(degraded = cashbook.is_degraded(), "CashBook starting");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let action = cli.command.action();
    match run(&cashbook, cli.command, &mut input, &mut out).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(AppError::Abandoned) => Ok(ExitCode::FAILURE),
        Err(err) => {
            out.flush()?;
            eprintln!("{}", err.user_message(action));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Dispatches one command to its view.
async fn run(
    cashbook: &Cashbook,
    command: Command,
    input: &mut impl io::BufRead,
    out: &mut impl Write,
) -> AppResult<()> {
    match command {
        Command::Dashboard => dashboard::run(cashbook, input, out).await,

        Command::Products(ProductCommand::List) => inventory::run(cashbook, input, out).await,
        Command::Products(ProductCommand::Add {
            name,
            price,
            stock,
            category,
        }) => {
            let product = NewProduct {
                name: name.trim().to_string(),
                price,
                stock_quantity: stock,
                category: category.filter(|c| !c.trim().is_empty()),
            };
            inventory::add(cashbook, product, out).await
        }
        Command::Products(ProductCommand::Update {
            id,
            name,
            price,
            stock,
            category,
        }) => {
            let changes = ProductUpdate {
                name,
                price,
                stock_quantity: stock,
                category,
            };
            inventory::update(cashbook, &id, changes, out).await
        }

        Command::Customers(CustomerCommand::List) => customers::run(cashbook, input, out).await,
        Command::Customers(CustomerCommand::Add {
            name,
            phone,
            balance,
        }) => {
            let customer = NewCustomer {
                name: name.trim().to_string(),
                phone: phone.filter(|p| !p.trim().is_empty()),
                current_balance: balance,
            };
            customers::add(cashbook, customer, out).await
        }
        Command::Customers(CustomerCommand::AdjustBalance { id, amount }) => {
            customers::adjust_balance(cashbook, &id, amount, out).await
        }

        Command::Sales(SaleCommand::List(args)) => {
            let filters = sales::sale_filters(args.from, args.to, args.status, args.payment_type)?;
            sales::run(cashbook, &filters, input, out).await
        }
        Command::Sales(SaleCommand::Record {
            items,
            payment,
            customer,
            charge,
        }) => {
            let form = sales::SaleForm {
                items,
                payment_type: payment,
                customer_id: customer,
                charge_customer: charge,
            };
            sales::record(cashbook, &form, out).await.map(|_| ())
        }

        Command::Report(ReportCommand::Sales {
            from,
            to,
            payment_type,
            status,
            export,
        }) => {
            let range = DateRange::for_days(from, to)?;
            let filters = ReportFilters {
                payment_type,
                payment_status: status,
            };
            reports::sales(cashbook, &range, &filters, export.as_deref(), input, out).await
        }
        Command::Report(ReportCommand::Inventory { export }) => {
            reports::inventory(cashbook, export.as_deref(), input, out).await
        }
        Command::Report(ReportCommand::Balances { export }) => {
            reports::balances(cashbook, export.as_deref(), input, out).await
        }

        Command::Whoami => account::whoami(cashbook, input, out).await,
        Command::SetRole { role } => account::set_role(cashbook, &role, out).await,
    }
}
