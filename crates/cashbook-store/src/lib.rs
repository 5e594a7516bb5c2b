//! # cashbook-store: Data-Access Layer for CashBook
//!
//! Every call to the hosted data store goes through this crate. It turns a
//! small parameter set into a filtered remote query and hands back domain
//! rows, normalizing "no rows" to an empty collection.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CashBook Data Flow                               │
//! │                                                                         │
//! │  CLI view (dashboard, inventory, reports...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  cashbook-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Cashbook    │    │  Repositories │    │    Export    │  │   │
//! │  │   │  (client.rs)  │    │ (repository/) │    │ (export.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ StoreConfig   │───►│ ProductRepo   │    │ rows → .csv  │  │   │
//! │  │   │ factory       │    │ SaleRepo ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                    Arc<dyn RemoteStore> (remote/)               │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │         Hosted data store: /rest/v1 tables + rpc, /auth/v1      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Store URL, key and token from env / TOML
//! - [`client`] - The [`Cashbook`] handle and its degraded mode
//! - [`remote`] - The [`RemoteStore`] trait and its implementations
//! - [`repository`] - One repository per table group
//! - [`export`] - CSV file export
//! - [`error`] - Data-access error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cashbook_store::{Cashbook, StoreConfig};
//!
//! let cashbook = Cashbook::connect(&StoreConfig::load()?)?;
//! let sales = cashbook.sales().list(&Default::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod remote;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::Cashbook;
pub use config::StoreConfig;
pub use error::{ConfigError, StoreError, StoreResult};
pub use export::export_csv;
pub use remote::{MemoryStore, NoopStore, Query, RemoteStore, RestStore};

// Repository re-exports for convenience
pub use repository::{
    AuthRepository, CustomerRepository, ProductRepository, ReportRepository, SaleRepository,
};
