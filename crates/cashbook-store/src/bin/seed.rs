//! # Seed Data Generator
//!
//! Populates the configured store with demo products and customers.
//!
//! ## Usage
//! ```bash
//! # Seed the store named by CASHBOOK_STORE_URL / CASHBOOK_STORE_ANON_KEY
//! cargo run -p cashbook-store --bin seed
//!
//! # Only the product catalogue
//! cargo run -p cashbook-store --bin seed -- --products-only
//!
//! # Use a specific config file
//! cargo run -p cashbook-store --bin seed -- --config ./cashbook.toml
//! ```
//!
//! ## Generated Data
//! - Products across categories a neighbourhood shop stocks, some of them
//!   deliberately below the low-stock threshold
//! - Customers, a few with outstanding credit

use std::env;
use std::path::PathBuf;

use cashbook_core::{Money, NewCustomer, NewProduct};
use cashbook_store::{Cashbook, StoreConfig};

/// (category, [(name, price in KSh, stock)])
const CATALOGUE: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "Groceries",
        &[
            ("Maize Flour 2kg", 210, 40),
            ("Wheat Flour 2kg", 195, 25),
            ("Sugar 1kg", 150, 8),
            ("Rice 1kg", 180, 30),
            ("Cooking Oil 1L", 320, 12),
            ("Salt 500g", 30, 60),
            ("Tea Leaves 250g", 85, 5),
        ],
    ),
    (
        "Dairy",
        &[
            ("Milk 500ml", 60, 24),
            ("Yoghurt 250ml", 70, 9),
            ("Butter 250g", 280, 3),
        ],
    ),
    (
        "Bakery",
        &[("White Bread 400g", 55, 18), ("Brown Bread 400g", 65, 0)],
    ),
    (
        "Household",
        &[
            ("Bar Soap", 120, 15),
            ("Washing Powder 500g", 145, 7),
            ("Matchbox", 5, 100),
            ("Paraffin 1L", 160, 20),
        ],
    ),
    (
        "Airtime",
        &[("Airtime 100", 100, 50), ("Airtime 50", 50, 50)],
    ),
];

/// (name, phone, balance owed in KSh)
const CUSTOMERS: &[(&str, &str, i64)] = &[
    ("Wanjiku Kamau", "0712345678", 450),
    ("Otieno Ochieng", "0722111222", 0),
    ("Akinyi Atieno", "0733444555", 1200),
    ("Mwangi Njoroge", "0700123123", 0),
    ("Fatuma Hassan", "0799888777", 75),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut products_only = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--products-only" => products_only = true,
            "--help" | "-h" => {
                println!("CashBook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("      --products-only  Skip demo customers");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 CashBook Seed Data Generator");
    println!("==============================");

    let config = match config_path {
        Some(path) => StoreConfig::load_with(|key| env::var(key).ok(), Some(path))?,
        None => StoreConfig::load()?,
    };
    let cashbook = Cashbook::connect(&config)?;

    if cashbook.is_degraded() {
        println!("⚠ No store configured (set CASHBOOK_STORE_URL and CASHBOOK_STORE_ANON_KEY).");
        println!("  Nothing to seed.");
        return Ok(());
    }
    println!("✓ Connected to store");

    let existing = cashbook.products().list().await?;
    if !existing.is_empty() {
        println!("⚠ Store already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Adding products...");
    let mut added = 0;
    for (category, items) in CATALOGUE {
        for (name, price, stock) in items.iter() {
            let product = NewProduct {
                name: name.to_string(),
                price: Money::from_major(*price),
                stock_quantity: *stock,
                category: Some(category.to_string()),
            };
            if let Err(e) = cashbook.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }
            added += 1;
        }
    }
    println!("✓ {} products added", added);

    if !products_only {
        println!();
        println!("Adding customers...");
        let mut added = 0;
        for (name, phone, balance) in CUSTOMERS {
            let customer = NewCustomer {
                name: name.to_string(),
                phone: Some(phone.to_string()),
                current_balance: Money::from_major(*balance),
            };
            if let Err(e) = cashbook.customers().insert(&customer).await {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }
            added += 1;
        }
        println!("✓ {} customers added", added);
    }

    println!();
    println!("🎉 Seed complete!");
    Ok(())
}
