//! # Product Repository
//!
//! Remote operations on the `products` table.
//!
//! ## Key Operations
//! - Listing, newest first
//! - Insert and partial update, returning the stored row
//! - Stock decrement through the `update_product_stock` procedure

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{decode_first, decode_rows, to_payload, PRODUCTS};
use crate::error::StoreResult;
use crate::remote::{Query, RemoteStore};
use cashbook_core::{NewProduct, Product, ProductUpdate, RecordId};

/// Repository for product operations.
///
/// ## Usage
/// ```rust,ignore
/// let products = cashbook.products().list().await?;
/// let added = cashbook.products().insert(&new_product).await?;
/// ```
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn RemoteStore>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        ProductRepository { store }
    }

    /// All products ordered by `created_at` descending. Never null.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let query = Query::table(PRODUCTS).order("created_at", false);
        let products: Vec<Product> = decode_rows(PRODUCTS, self.store.select(&query).await?)?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a product and returns the stored row.
    ///
    /// `None` when the store returns no row (degraded mode).
    pub async fn insert(&self, product: &NewProduct) -> StoreResult<Option<Product>> {
        info!(name = %product.name, "Inserting product");
        let rows = self.store.insert(PRODUCTS, vec![to_payload(product)?]).await?;
        decode_first(PRODUCTS, rows)
    }

    /// Applies a partial update to the product with `id`.
    ///
    /// Returns the updated row, or `None` when no row matched.
    pub async fn update(&self, id: &RecordId, changes: &ProductUpdate) -> StoreResult<Option<Product>> {
        info!(product_id = %id, "Updating product");
        let query = Query::table(PRODUCTS).eq("id", id);
        let rows = self.store.update(&query, to_payload(changes)?).await?;
        decode_first(PRODUCTS, rows)
    }

    /// Calls `update_product_stock(product_id, quantity_sold)`.
    ///
    /// Returns the procedure's result unchanged.
    pub async fn update_stock(&self, id: &RecordId, quantity_sold: i64) -> StoreResult<Value> {
        debug!(product_id = %id, quantity_sold, "Decrementing stock");
        self.store
            .rpc(
                "update_product_stock",
                json!({ "product_id": id, "quantity_sold": quantity_sold }),
            )
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
