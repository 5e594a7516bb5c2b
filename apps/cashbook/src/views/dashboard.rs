//! Dashboard: headline numbers and the most recent sales.

use std::io::{BufRead, Write};

use cashbook_core::stats::{recent_sales, DashboardStats};
use cashbook_core::{Sale, SaleFilters, RECENT_SALES_LIMIT};
use cashbook_store::Cashbook;
use tracing::debug;

use crate::error::AppResult;
use crate::render;
use crate::views::load_with_retry;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent: Vec<Sale>,
}

/// Loads sales, then customers, then products.
pub async fn load(cashbook: &Cashbook) -> AppResult<Dashboard> {
    let sales = cashbook.sales().list(&SaleFilters::default()).await?;
    let customers = cashbook.customers().list().await?;
    let products = cashbook.products().list().await?;

    let stats = DashboardStats::compute(&sales, &customers, &products);
    debug!(?stats, "Dashboard computed");

    Ok(Dashboard {
        stats,
        recent: recent_sales(&sales, RECENT_SALES_LIMIT).to_vec(),
    })
}

pub fn render(dashboard: &Dashboard, out: &mut impl Write) -> AppResult<()> {
    let stats = &dashboard.stats;

    render::heading(out, "Dashboard")?;
    render::stat_line(out, "Total Sales", stats.total_sales)?;
    render::stat_line(out, "Pending Payments", stats.pending_payments)?;
    render::stat_line(out, "Low Stock Items", stats.low_stock_items)?;
    render::stat_line(out, "Total Customers", stats.total_customers)?;

    render::heading(out, "Recent Sales")?;
    if dashboard.recent.is_empty() {
        writeln!(out, "No sales yet.")?;
        return Ok(());
    }

    let rows = dashboard.recent.iter().map(|sale| {
        vec![
            sale.customer_name().to_string(),
            render::payment_type_badge(sale.payment_type).to_string(),
            render::payment_status_badge(sale.payment_status).to_string(),
            render::date_time(sale.created_at),
            sale.total_amount.to_string(),
        ]
    });
    writeln!(
        out,
        "{}",
        render::table(["Customer", "Type", "Status", "Date", "Amount"], rows, &[4])
    )?;
    Ok(())
}

pub async fn run(cashbook: &Cashbook, input: &mut impl BufRead, out: &mut impl Write) -> AppResult<()> {
    let dashboard = load_with_retry("load dashboard data", input, out, || load(cashbook)).await?;
    render(&dashboard, out)
}
