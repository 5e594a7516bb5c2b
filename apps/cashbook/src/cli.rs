//! Command line definition.

use std::path::PathBuf;

use cashbook_core::{Money, PaymentStatus, PaymentType, RecordId};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Cashbook and inventory manager for small shops.
#[derive(Debug, Parser)]
#[command(name = "cashbook", version, about)]
pub struct Cli {
    /// Config file (default: cashbook.toml in the platform config directory)
    #[arg(short, long, global = true, env = "CASHBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Headline totals and the most recent sales
    Dashboard,

    /// Product inventory
    #[command(subcommand)]
    Products(ProductCommand),

    /// Customers and their credit balances
    #[command(subcommand)]
    Customers(CustomerCommand),

    /// Sales history and new sales
    #[command(subcommand)]
    Sales(SaleCommand),

    /// Printable and exportable reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Show the signed-in user and their role
    Whoami,

    /// Change the signed-in user's role
    SetRole {
        role: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List products, newest first
    List,

    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        /// Price in KSh, e.g. 150 or 99.50
        #[arg(long)]
        price: Money,
        #[arg(long, default_value_t = 0)]
        stock: i64,
        #[arg(long)]
        category: Option<String>,
    },

    /// Change some fields of a product
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Money>,
        #[arg(long)]
        stock: Option<i64>,
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// List customers by name
    List,

    /// Add a customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        /// Opening balance owed, in KSh
        #[arg(long, default_value = "0")]
        balance: Money,
    },

    /// Add an amount to a customer's balance (negative for a payment)
    AdjustBalance {
        id: RecordId,
        #[arg(allow_negative_numbers = true)]
        amount: Money,
    },
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// List sales, newest first
    List(SaleListArgs),

    /// Record a sale
    Record {
        /// PRODUCT_ID:QUANTITY, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        /// cash or credit
        #[arg(long, default_value = "cash")]
        payment: PaymentType,
        /// Customer ID, required for credit sales
        #[arg(long)]
        customer: Option<RecordId>,
        /// Also add a credit sale's total to the customer's balance
        #[arg(long)]
        charge: bool,
    },
}

#[derive(Debug, Args)]
pub struct SaleListArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// paid or pending
    #[arg(long)]
    pub status: Option<PaymentStatus>,
    /// cash or credit
    #[arg(long = "type")]
    pub payment_type: Option<PaymentType>,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Sales between two days
    Sales {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long = "type")]
        payment_type: Option<PaymentType>,
        #[arg(long)]
        status: Option<PaymentStatus>,
        /// Directory to write the CSV into
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Products, lowest stock first
    Inventory {
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Customers who owe money, largest balance first
    Balances {
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

impl Command {
    /// Completes "Failed to ..." in error messages.
    pub fn action(&self) -> &'static str {
        match self {
            Command::Dashboard => "load dashboard data",
            Command::Products(ProductCommand::List) => "load products",
            Command::Products(ProductCommand::Add { .. }) => "add the product",
            Command::Products(ProductCommand::Update { .. }) => "update the product",
            Command::Customers(CustomerCommand::List) => "load customers",
            Command::Customers(CustomerCommand::Add { .. }) => "add the customer",
            Command::Customers(CustomerCommand::AdjustBalance { .. }) => "update the balance",
            Command::Sales(SaleCommand::List(_)) => "load sales",
            Command::Sales(SaleCommand::Record { .. }) => "record the sale",
            Command::Report(_) => "load the report",
            Command::Whoami => "load the current user",
            Command::SetRole { .. } => "update the role",
        }
    }
}
