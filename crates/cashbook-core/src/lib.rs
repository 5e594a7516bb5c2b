//! # cashbook-core: Pure Business Logic for CashBook
//!
//! Row types, money arithmetic and the small amount of aggregation the views
//! perform over rows fetched from the remote data store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CashBook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/cashbook (views)                          │   │
//! │  │    dashboard ──► inventory ──► sales ──► customers ──► reports  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ cashbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   stats   │  │    csv    │  │   │
//! │  │   │  Product  │  │   Money   │  │ Dashboard │  │  to_csv   │  │   │
//! │  │   │   Sale    │  │   KSh     │  │ Inventory │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              cashbook-store (Data-Access Layer)                 │   │
//! │  │        remote queries, procedures, repositories, export         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Row types (Product, Sale, SaleItem, Customer, AuthUser)
//! - [`money`] - Money type with integer arithmetic
//! - [`stats`] - Dashboard, inventory and credit statistics
//! - [`csv`] - CSV serialization of arbitrary rows
//! - [`validation`] - Form input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cashbook_core::money::Money;
//!
//! let price = Money::from_major(120);
//! let line_total = price.multiply_quantity(3).unwrap();
//! assert_eq!(line_total, Money::from_major(360));
//! ```

pub mod csv;
pub mod error;
pub mod money;
pub mod stats;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

/// Products with fewer units than this are flagged for restocking.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Largest quantity accepted on one line item.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Number of sales shown in the dashboard's "Recent Sales" card.
pub const RECENT_SALES_LIMIT: usize = 5;

/// Role assumed when a user's metadata carries none.
pub const DEFAULT_ROLE: &str = "employee";
