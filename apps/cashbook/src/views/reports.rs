//! Reports: sales over a date range, inventory and customer balances, each
//! printable as a table and exportable to CSV.

use std::io::{BufRead, Write};
use std::path::Path;

use cashbook_core::stats::{InventorySummary, SalesBreakdown};
use cashbook_core::{Customer, DateRange, Product, ReportFilters, Sale};
use cashbook_store::{export_csv, Cashbook};
use serde::Serialize;
use tracing::info;

use crate::error::AppResult;
use crate::render;
use crate::views::{customers as customer_view, inventory as inventory_view, load_with_retry};

/// File name (without extension) for a sales report export.
pub fn sales_report_name(range: &DateRange) -> String {
    format!(
        "sales-report-{}-to-{}",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}

pub const INVENTORY_REPORT_NAME: &str = "inventory-report";
pub const BALANCES_REPORT_NAME: &str = "customer-balances";

/// Writes `rows` to `<dir>/<name>.csv` when a directory was given.
fn export<T: Serialize>(rows: &[T], dir: Option<&Path>, name: &str, out: &mut impl Write) -> AppResult<()> {
    let Some(dir) = dir else {
        return Ok(());
    };

    match export_csv(rows, dir, name)? {
        Some(path) => {
            info!(path = %path.display(), rows = rows.len(), "Report exported");
            writeln!(out, "Exported {} rows to {}", rows.len(), path.display())?;
        }
        None => writeln!(out, "Nothing to export.")?,
    }
    Ok(())
}

// =============================================================================
// Sales Report
// =============================================================================

pub async fn load_sales(cashbook: &Cashbook, range: &DateRange, filters: &ReportFilters) -> AppResult<Vec<Sale>> {
    Ok(cashbook.reports().sales(range, filters).await?)
}

pub fn render_sales(range: &DateRange, sales: &[Sale], out: &mut impl Write) -> AppResult<()> {
    render::heading(
        out,
        &format!(
            "Sales Report {} to {}",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        ),
    )?;
    if sales.is_empty() {
        writeln!(out, "No sales in this period.")?;
        return Ok(());
    }

    let rows = sales.iter().map(|sale| {
        let products = sale
            .sale_items
            .iter()
            .map(|item| {
                let name = item.product.as_ref().map_or(render::EMPTY_CELL, |p| p.name.as_str());
                format!("{name} x{}", item.quantity)
            })
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            render::date_time(sale.created_at),
            sale.customer_name().to_string(),
            products,
            render::payment_type_badge(sale.payment_type).to_string(),
            render::payment_status_badge(sale.payment_status).to_string(),
            sale.total_amount.to_string(),
        ]
    });
    writeln!(
        out,
        "{}",
        render::table(["Date", "Customer", "Products", "Type", "Status", "Amount"], rows, &[5])
    )?;

    let breakdown = SalesBreakdown::compute(sales);
    render::stat_line(out, "Sales", breakdown.sale_count)?;
    render::stat_line(out, "Cash", breakdown.cash)?;
    render::stat_line(out, "Credit", breakdown.credit)?;
    render::stat_line(out, "Pending", breakdown.pending)?;
    render::stat_line(out, "Total", breakdown.total)?;
    Ok(())
}

pub async fn sales(
    cashbook: &Cashbook,
    range: &DateRange,
    filters: &ReportFilters,
    export_dir: Option<&Path>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> AppResult<()> {
    let sales = load_with_retry("load the sales report", input, out, || {
        load_sales(cashbook, range, filters)
    })
    .await?;
    render_sales(range, &sales, out)?;
    export(&sales, export_dir, &sales_report_name(range), out)
}

// =============================================================================
// Inventory Report
// =============================================================================

pub async fn load_inventory(cashbook: &Cashbook) -> AppResult<Vec<Product>> {
    Ok(cashbook.reports().inventory().await?)
}

pub async fn inventory(
    cashbook: &Cashbook,
    export_dir: Option<&Path>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> AppResult<()> {
    let products = load_with_retry("load the inventory report", input, out, || load_inventory(cashbook)).await?;
    inventory_view::render(&products, out)?;

    let summary = InventorySummary::compute(&products);
    if summary.low_stock_items > 0 {
        writeln!(out, "{} products need restocking.", summary.low_stock_items)?;
    }
    export(&products, export_dir, INVENTORY_REPORT_NAME, out)
}

// =============================================================================
// Customer Balances Report
// =============================================================================

pub async fn load_balances(cashbook: &Cashbook) -> AppResult<Vec<Customer>> {
    Ok(cashbook.reports().customer_balances().await?)
}

pub async fn balances(
    cashbook: &Cashbook,
    export_dir: Option<&Path>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> AppResult<()> {
    let owing = load_with_retry("load customer balances", input, out, || load_balances(cashbook)).await?;
    customer_view::render(&owing, out)?;
    export(&owing, export_dir, BALANCES_REPORT_NAME, out)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate, Utc};
    use serde_json::json;

    use super::*;
    use crate::views::test_support::{cashbook, output, shop};

    fn today() -> DateRange {
        let now = Utc::now();
        DateRange::new(now - Duration::hours(1), now + Duration::hours(1)).unwrap()
    }

    #[test]
    fn test_sales_report_name() {
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
        let range = DateRange::for_days(day(1), day(31)).unwrap();
        assert_eq!(sales_report_name(&range), "sales-report-2026-03-01-to-2026-03-31");
    }

    #[tokio::test]
    async fn test_sales_report_prints_breakdown_and_exports() {
        let store = Arc::new(shop().with_rows(
            "sales",
            vec![
                json!({ "id": 1, "total_amount": 300, "payment_type": "cash", "payment_status": "paid" }),
                json!({ "id": 2, "total_amount": 120, "payment_type": "credit", "payment_status": "pending", "customer_id": 1 }),
            ],
        ).with_rows(
            "sale_items",
            vec![
                json!({ "sale_id": 1, "product_id": 1, "quantity": 2, "unit_price": 150, "total": 300 }),
                json!({ "sale_id": 2, "product_id": 2, "quantity": 2, "unit_price": 60, "total": 120 }),
            ],
        ));
        let dir = tempfile::tempdir().unwrap();
        let range = today();

        let mut input = Cursor::new("");
        let mut out = Vec::new();
        sales(
            &cashbook(&store),
            &range,
            &ReportFilters::default(),
            Some(dir.path()),
            &mut input,
            &mut out,
        )
        .await
        .unwrap();

        let printed = output(out);
        assert!(printed.contains("Sugar 1kg x2"));
        assert!(printed.contains("KSh 420.00"));
        assert!(printed.contains("Exported 2 rows"));

        let csv = std::fs::read_to_string(dir.path().join(format!("{}.csv", sales_report_name(&range)))).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(!csv.contains("sale_id"));
    }

    #[tokio::test]
    async fn test_empty_report_exports_nothing() {
        let store = Arc::new(shop());
        let dir = tempfile::tempdir().unwrap();

        let mut input = Cursor::new("");
        let mut out = Vec::new();
        sales(
            &cashbook(&store),
            &today(),
            &ReportFilters::default(),
            Some(dir.path()),
            &mut input,
            &mut out,
        )
        .await
        .unwrap();

        let printed = output(out);
        assert!(printed.contains("No sales in this period."));
        assert!(printed.contains("Nothing to export."));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_inventory_report_exports_by_stock() {
        let store = Arc::new(shop());
        let dir = tempfile::tempdir().unwrap();

        let mut input = Cursor::new("");
        let mut out = Vec::new();
        inventory(&cashbook(&store), Some(dir.path()), &mut input, &mut out)
            .await
            .unwrap();

        assert!(output(out).contains("1 products need restocking."));
        let csv = std::fs::read_to_string(dir.path().join("inventory-report.csv")).unwrap();
        let first_row = csv.lines().nth(1).unwrap();
        assert!(first_row.contains("\"Bread\""));
    }

    #[tokio::test]
    async fn test_balances_report_lists_only_owing_customers() {
        let store = Arc::new(shop());

        let mut input = Cursor::new("");
        let mut out = Vec::new();
        balances(&cashbook(&store), None, &mut input, &mut out)
            .await
            .unwrap();

        let printed = output(out);
        assert!(printed.contains("Wanjiku"));
        assert!(!printed.contains("Otieno"));
    }
}
