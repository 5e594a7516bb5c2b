//! # Sale Repository
//!
//! Remote operations on `sales` and `sale_items`.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      record(sale, items)                                │
//! │                                                                         │
//! │  1. POST sales        [sale]                 → sale row (id)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. POST sale_items   [item + sale_id, ...]  → item rows  (one call)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. rpc update_product_stock(product_id, quantity)   × each item       │
//! │                                                                         │
//! │  ⚠ Three independent requests. No transaction spans them: a failure   │
//! │    at any step leaves every earlier step applied.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::product::ProductRepository;
use super::{decode_first, decode_rows, to_payload, SALES, SALE_ITEMS};
use crate::error::{StoreError, StoreResult};
use crate::remote::{filter_timestamp, Query, RemoteStore};
use cashbook_core::{NewSale, NewSaleItem, RecordId, RecordedSale, Sale, SaleFilters, SaleItem};

/// Sale columns with the customer summary and line items embedded.
pub const SALE_LIST_SELECT: &str =
    "*, customer:customers(name, phone), sale_items:sale_items(*, product:products(name, price))";

/// Line item payload once the sale id is known.
#[derive(Serialize)]
struct SaleItemRow<'a> {
    #[serde(flatten)]
    item: &'a NewSaleItem,
    sale_id: &'a RecordId,
}

/// Repository for sale operations.
#[derive(Clone)]
pub struct SaleRepository {
    store: Arc<dyn RemoteStore>,
}

impl SaleRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        SaleRepository { store }
    }

    /// Sales newest first, each with its customer and items embedded.
    ///
    /// ## Filters
    /// - `start` / `end`: inclusive bounds on `created_at`
    /// - `payment_status`, `payment_type`: exact matches
    pub async fn list(&self, filters: &SaleFilters) -> StoreResult<Vec<Sale>> {
        let mut query = Query::table(SALES)
            .select(SALE_LIST_SELECT)
            .order("created_at", false);

        if let Some(start) = filters.start {
            query = query.gte("created_at", filter_timestamp(start));
        }
        if let Some(end) = filters.end {
            query = query.lte("created_at", filter_timestamp(end));
        }
        if let Some(status) = filters.payment_status {
            query = query.eq("payment_status", status);
        }
        if let Some(payment_type) = filters.payment_type {
            query = query.eq("payment_type", payment_type);
        }

        let sales: Vec<Sale> = decode_rows(SALES, self.store.select(&query).await?)?;
        debug!(count = sales.len(), filters = query.filters.len(), "Listed sales");
        Ok(sales)
    }

    /// Records a sale with its line items and decrements stock.
    ///
    /// ## Steps
    /// 1. Insert the sale row. No row back → [`StoreError::EmptyInsert`].
    /// 2. Insert every line item, tagged with the new sale id, in one call.
    /// 3. Call `update_product_stock` once per item, in order.
    ///
    /// ## Not Atomic
    /// These are separate remote calls. If step 2 fails the sale row
    /// exists without items; if the stock update for item k fails, items
    /// before k have already been decremented. Nothing is rolled back and
    /// the first error is returned as is.
    pub async fn record(&self, sale: &NewSale, items: &[NewSaleItem]) -> StoreResult<RecordedSale> {
        info!(
            total = %sale.total_amount,
            payment_type = %sale.payment_type,
            items = items.len(),
            "Recording sale"
        );

        let rows = self.store.insert(SALES, vec![to_payload(sale)?]).await?;
        let sale: Sale = decode_first(SALES, rows)?.ok_or_else(|| StoreError::EmptyInsert {
            table: SALES.to_string(),
        })?;
        debug!(sale_id = %sale.id, "Sale row inserted");

        let payload = items
            .iter()
            .map(|item| {
                to_payload(&SaleItemRow {
                    item,
                    sale_id: &sale.id,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        let inserted: Vec<SaleItem> = decode_rows(SALE_ITEMS, self.store.insert(SALE_ITEMS, payload).await?)?;

        let products = ProductRepository::new(self.store.clone());
        for item in items {
            products.update_stock(&item.product_id, item.quantity).await?;
        }

        info!(sale_id = %sale.id, "Sale recorded");
        Ok(RecordedSale {
            sale,
            items: inserted,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
