//! # Report Repository
//!
//! Read-only report queries. Each returns rows ready for a table view or
//! [`export_csv`](crate::export::export_csv).

use std::sync::Arc;
use tracing::debug;

use super::{decode_rows, CUSTOMERS, PRODUCTS, SALES};
use crate::error::StoreResult;
use crate::remote::{filter_timestamp, Query, RemoteStore};
use cashbook_core::{Customer, DateRange, Product, ReportFilters, Sale};

/// Sale columns for the sales report: line items carry product category
/// instead of price.
pub const SALES_REPORT_SELECT: &str = "*, customer:customers(name, phone), \
     sale_items:sale_items(quantity, unit_price, total, product:products(name, category))";

#[derive(Clone)]
pub struct ReportRepository {
    store: Arc<dyn RemoteStore>,
}

impl ReportRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        ReportRepository { store }
    }

    /// Sales created within `range` (inclusive), newest first.
    pub async fn sales(&self, range: &DateRange, filters: &ReportFilters) -> StoreResult<Vec<Sale>> {
        let mut query = Query::table(SALES)
            .select(SALES_REPORT_SELECT)
            .gte("created_at", filter_timestamp(range.start))
            .lte("created_at", filter_timestamp(range.end))
            .order("created_at", false);

        if let Some(payment_type) = filters.payment_type {
            query = query.eq("payment_type", payment_type);
        }
        if let Some(status) = filters.payment_status {
            query = query.eq("payment_status", status);
        }

        let sales: Vec<Sale> = decode_rows(SALES, self.store.select(&query).await?)?;
        debug!(count = sales.len(), "Sales report");
        Ok(sales)
    }

    /// Every product, lowest stock first.
    pub async fn inventory(&self) -> StoreResult<Vec<Product>> {
        let query = Query::table(PRODUCTS).order("stock_quantity", true);
        let products: Vec<Product> = decode_rows(PRODUCTS, self.store.select(&query).await?)?;
        debug!(count = products.len(), "Inventory report");
        Ok(products)
    }

    /// Customers who owe money, largest balance first.
    pub async fn customer_balances(&self) -> StoreResult<Vec<Customer>> {
        let query = Query::table(CUSTOMERS)
            .gt("current_balance", 0)
            .order("current_balance", false);
        let customers: Vec<Customer> = decode_rows(CUSTOMERS, self.store.select(&query).await?)?;
        debug!(count = customers.len(), "Customer balance report");
        Ok(customers)
    }
}
