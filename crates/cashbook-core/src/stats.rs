//! # Statistics
//!
//! Derived values the views display. Everything here is a plain fold over
//! rows already fetched from the remote store.
//!
//! ```text
//! sales ─────┐
//! customers ─┼──► DashboardStats { total_sales, pending_payments,
//! products ──┘                     low_stock_items, total_customers }
//! ```

use serde::Serialize;

use crate::money::Money;
use crate::types::{Customer, PaymentType, Product, Sale};

// =============================================================================
// Dashboard
// =============================================================================

/// The four cards at the top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Sum of every sale's total.
    pub total_sales: Money,
    /// Sum of totals for sales still pending payment.
    pub pending_payments: Money,
    /// Products below the low-stock threshold.
    pub low_stock_items: usize,
    pub total_customers: usize,
}

impl DashboardStats {
    pub fn compute(sales: &[Sale], customers: &[Customer], products: &[Product]) -> Self {
        DashboardStats {
            total_sales: total_sales(sales),
            pending_payments: pending_payments(sales),
            low_stock_items: low_stock_count(products),
            total_customers: customers.len(),
        }
    }
}

/// Sum of `total_amount` over all sales.
pub fn total_sales(sales: &[Sale]) -> Money {
    sales.iter().map(|s| s.total_amount).sum()
}

/// Sum of `total_amount` over pending sales.
pub fn pending_payments(sales: &[Sale]) -> Money {
    sales
        .iter()
        .filter(|s| s.is_pending())
        .map(|s| s.total_amount)
        .sum()
}

/// Number of products strictly below the low-stock threshold.
pub fn low_stock_count(products: &[Product]) -> usize {
    products.iter().filter(|p| p.is_low_stock()).count()
}

/// The first `limit` sales. Lists come back newest first.
pub fn recent_sales(sales: &[Sale], limit: usize) -> &[Sale] {
    &sales[..sales.len().min(limit)]
}

// =============================================================================
// Inventory
// =============================================================================

/// Summary line under the inventory table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub product_count: usize,
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    /// Σ price × units on hand.
    pub stock_value: Money,
}

impl InventorySummary {
    pub fn compute(products: &[Product]) -> Self {
        InventorySummary {
            product_count: products.len(),
            low_stock_items: low_stock_count(products),
            out_of_stock_items: products.iter().filter(|p| p.stock() <= 0).count(),
            stock_value: products.iter().map(Product::stock_value).sum(),
        }
    }
}

// =============================================================================
// Customer Credit
// =============================================================================

/// Outstanding credit across customers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreditSummary {
    pub customers_with_balance: usize,
    pub total_outstanding: Money,
}

impl CreditSummary {
    pub fn compute(customers: &[Customer]) -> Self {
        let owing = customers.iter().filter(|c| c.has_outstanding_balance());
        CreditSummary {
            customers_with_balance: owing.clone().count(),
            total_outstanding: owing.map(|c| c.current_balance).sum(),
        }
    }
}

// =============================================================================
// Sales Breakdown
// =============================================================================

/// Totals of a sales report split by payment type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SalesBreakdown {
    pub sale_count: usize,
    pub cash: Money,
    pub credit: Money,
    pub pending: Money,
    pub total: Money,
}

impl SalesBreakdown {
    pub fn compute(sales: &[Sale]) -> Self {
        let by_type = |kind: PaymentType| -> Money {
            sales
                .iter()
                .filter(|s| s.payment_type == kind)
                .map(|s| s.total_amount)
                .sum()
        };
        SalesBreakdown {
            sale_count: sales.len(),
            cash: by_type(PaymentType::Cash),
            credit: by_type(PaymentType::Credit),
            pending: pending_payments(sales),
            total: total_sales(sales),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentStatus, RecordId};

    fn sale(id: i64, total: i64, payment_type: PaymentType, status: PaymentStatus) -> Sale {
        Sale {
            id: RecordId::Int(id),
            total_amount: Money::from_major(total),
            payment_type,
            payment_status: status,
            customer_id: None,
            created_at: None,
            customer: None,
            sale_items: Vec::new(),
        }
    }

    fn product(stock: Option<i64>, price: i64) -> Product {
        Product {
            id: RecordId::Int(1),
            name: "Item".to_string(),
            price: Money::from_major(price),
            stock_quantity: stock,
            category: None,
            created_at: None,
        }
    }

    fn customer(balance: i64) -> Customer {
        Customer {
            id: RecordId::Int(1),
            name: "Customer".to_string(),
            phone: None,
            current_balance: Money::from_major(balance),
            created_at: None,
        }
    }

    #[test]
    fn test_dashboard_totals() {
        let sales = vec![
            sale(1, 100, PaymentType::Cash, PaymentStatus::Paid),
            sale(2, 50, PaymentType::Credit, PaymentStatus::Pending),
        ];
        let stats = DashboardStats::compute(&sales, &[customer(0)], &[]);

        assert_eq!(stats.total_sales, Money::from_major(150));
        assert_eq!(stats.pending_payments, Money::from_major(50));
        assert_eq!(stats.total_customers, 1);
    }

    #[test]
    fn test_low_stock_count() {
        let products: Vec<Product> = [5, 12, 9, 10]
            .into_iter()
            .map(|s| product(Some(s), 10))
            .collect();
        assert_eq!(low_stock_count(&products), 2);
    }

    #[test]
    fn test_null_stock_counts_as_low() {
        assert_eq!(low_stock_count(&[product(None, 10)]), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let stats = DashboardStats::compute(&[], &[], &[]);
        assert_eq!(stats, DashboardStats::default());
        assert!(recent_sales(&[], 5).is_empty());
    }

    #[test]
    fn test_recent_sales_limit() {
        let sales: Vec<Sale> = (1..=8)
            .map(|i| sale(i, 10, PaymentType::Cash, PaymentStatus::Paid))
            .collect();
        let recent = recent_sales(&sales, 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id, RecordId::Int(1));
        assert_eq!(recent_sales(&sales[..3], 5).len(), 3);
    }

    #[test]
    fn test_inventory_summary() {
        let products = vec![product(Some(0), 100), product(Some(4), 50), product(Some(20), 10)];
        let summary = InventorySummary::compute(&products);

        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.low_stock_items, 2);
        assert_eq!(summary.out_of_stock_items, 1);
        assert_eq!(summary.stock_value, Money::from_major(400));
    }

    #[test]
    fn test_credit_summary_ignores_settled_customers() {
        let customers = vec![customer(300), customer(0), customer(-20), customer(150)];
        let summary = CreditSummary::compute(&customers);

        assert_eq!(summary.customers_with_balance, 2);
        assert_eq!(summary.total_outstanding, Money::from_major(450));
    }

    #[test]
    fn test_sales_breakdown() {
        let sales = vec![
            sale(1, 100, PaymentType::Cash, PaymentStatus::Paid),
            sale(2, 70, PaymentType::Credit, PaymentStatus::Pending),
            sale(3, 30, PaymentType::Credit, PaymentStatus::Paid),
        ];
        let breakdown = SalesBreakdown::compute(&sales);

        assert_eq!(breakdown.sale_count, 3);
        assert_eq!(breakdown.cash, Money::from_major(100));
        assert_eq!(breakdown.credit, Money::from_major(100));
        assert_eq!(breakdown.pending, Money::from_major(70));
        assert_eq!(breakdown.total, Money::from_major(200));
    }
}
