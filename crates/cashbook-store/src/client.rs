//! # Client Factory
//!
//! Builds the shared handle every view uses to reach the data store.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashbook::connect                                │
//! │                                                                         │
//! │  StoreConfig::load()                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  url + anon key present? ──yes──► RestStore  (real remote calls)       │
//! │       │                                                                 │
//! │       no                                                                │
//! │       ▼                                                                 │
//! │  warn!("...degraded...") ───────► NoopStore  (empty results)           │
//! │                                                                         │
//! │  Either way the handle is built once and shared by cloning.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::remote::{NoopStore, RemoteStore, RestStore};
use crate::repository::{
    AuthRepository, CustomerRepository, ProductRepository, ReportRepository, SaleRepository,
};

/// Main handle providing repository access.
///
/// Cheap to clone: clones share one [`RemoteStore`].
///
/// ## Example
/// ```rust,ignore
/// let cashbook = Cashbook::connect(&StoreConfig::load()?)?;
/// let products = cashbook.products().list().await?;
/// ```
#[derive(Clone)]
pub struct Cashbook {
    store: Arc<dyn RemoteStore>,
    degraded: bool,
}

impl Cashbook {
    /// Creates the client from explicit configuration.
    ///
    /// Missing or blank URL/key does not fail: the client is built over
    /// [`NoopStore`] and every call resolves to an empty result.
    ///
    /// ## Errors
    /// Only when the HTTP client itself cannot be constructed.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        if !config.is_complete() {
            warn!(
                has_url = config.url.is_some(),
                has_key = config.anon_key.is_some(),
                "Store URL or key missing; running in degraded mode with no data"
            );
            return Ok(Self::degraded());
        }

        let store = RestStore::new(config)?;
        info!("Connected to remote store");
        Ok(Cashbook {
            store: Arc::new(store),
            degraded: false,
        })
    }

    /// Uses any [`RemoteStore`] implementation.
    pub fn with_store(store: Arc<dyn RemoteStore>) -> Self {
        Cashbook {
            store,
            degraded: false,
        }
    }

    /// A client over [`NoopStore`].
    pub fn degraded() -> Self {
        Cashbook {
            store: Arc::new(NoopStore),
            degraded: true,
        }
    }

    /// True when running without a configured store.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The underlying store, for queries no repository covers.
    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.store.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.store.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.store.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.store.clone())
    }

    pub fn auth(&self) -> AuthRepository {
        AuthRepository::new(self.store.clone())
    }
}

impl fmt::Debug for Cashbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cashbook")
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
