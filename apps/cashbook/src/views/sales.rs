//! Sales: the filtered sales list and the new-sale form.

use std::io::{BufRead, Write};

use cashbook_core::stats::SalesBreakdown;
use cashbook_core::validation::{parse_line_item, validate_sale_header};
use cashbook_core::{
    DateRange, NewSale, NewSaleItem, PaymentStatus, PaymentType, RecordId, RecordedSale, Sale,
    SaleFilters,
};
use cashbook_store::Cashbook;
use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::render;
use crate::views::load_with_retry;

/// Builds list filters from optional whole-day bounds.
pub fn sale_filters(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    payment_status: Option<PaymentStatus>,
    payment_type: Option<PaymentType>,
) -> AppResult<SaleFilters> {
    let (start, end) = match (from, to) {
        (Some(first), Some(last)) => {
            let range = DateRange::for_days(first, last)?;
            (Some(range.start), Some(range.end))
        }
        (Some(first), None) => (Some(first.and_time(NaiveTime::MIN).and_utc()), None),
        (None, Some(last)) => (None, Some(DateRange::for_days(last, last)?.end)),
        (None, None) => (None, None),
    };

    Ok(SaleFilters {
        start,
        end,
        payment_status,
        payment_type,
    })
}

pub async fn load(cashbook: &Cashbook, filters: &SaleFilters) -> AppResult<Vec<Sale>> {
    Ok(cashbook.sales().list(filters).await?)
}

pub fn render(sales: &[Sale], out: &mut impl Write) -> AppResult<()> {
    render::heading(out, "Sales")?;
    if sales.is_empty() {
        writeln!(out, "No sales found.")?;
        return Ok(());
    }

    let rows = sales.iter().map(|sale| {
        vec![
            sale.id.to_string(),
            render::date_time(sale.created_at),
            sale.customer_name().to_string(),
            sale.sale_items.len().to_string(),
            render::payment_type_badge(sale.payment_type).to_string(),
            render::payment_status_badge(sale.payment_status).to_string(),
            sale.total_amount.to_string(),
        ]
    });
    writeln!(
        out,
        "{}",
        render::table(
            ["ID", "Date", "Customer", "Items", "Type", "Status", "Amount"],
            rows,
            &[3, 6]
        )
    )?;

    let breakdown = SalesBreakdown::compute(sales);
    render::stat_line(out, "Sales", breakdown.sale_count)?;
    render::stat_line(out, "Total", breakdown.total)?;
    render::stat_line(out, "Pending", breakdown.pending)?;
    Ok(())
}

pub async fn run(
    cashbook: &Cashbook,
    filters: &SaleFilters,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> AppResult<()> {
    let sales = load_with_retry("load sales", input, out, || load(cashbook, filters)).await?;
    render(&sales, out)
}

/// The new-sale form as entered on the command line.
#[derive(Debug, Clone)]
pub struct SaleForm {
    /// `PRODUCT_ID:QUANTITY` entries.
    pub items: Vec<String>,
    pub payment_type: PaymentType,
    pub customer_id: Option<RecordId>,
    /// Add a credit sale's total to the customer's balance.
    pub charge_customer: bool,
}

/// Validates the form, prices each line from the product list and records
/// the sale.
pub async fn record(cashbook: &Cashbook, form: &SaleForm, out: &mut impl Write) -> AppResult<RecordedSale> {
    let lines = form
        .items
        .iter()
        .map(|item| parse_line_item(item))
        .collect::<Result<Vec<_>, _>>()?;
    validate_sale_header(form.payment_type, form.customer_id.as_ref(), lines.len())?;

    if let Some(customer_id) = &form.customer_id {
        let customers = cashbook.customers().list().await?;
        if !customers.iter().any(|c| &c.id == customer_id) {
            return Err(AppError::not_found("Customer", customer_id));
        }
    }

    let products = cashbook.products().list().await?;
    let items = lines
        .into_iter()
        .map(|(product_id, quantity)| -> AppResult<NewSaleItem> {
            let product = products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| AppError::not_found("Product", &product_id))?;
            if quantity > product.stock() {
                warn!(
                    product = %product.name,
                    quantity,
                    stock = product.stock(),
                    "Selling more than is in stock"
                );
            }
            Ok(NewSaleItem::new(product_id, quantity, product.price)?)
        })
        .collect::<AppResult<Vec<_>>>()?;

    let sale = NewSale::from_items(&items, form.payment_type, form.customer_id.clone())?;
    let recorded = cashbook.sales().record(&sale, &items).await?;

    if form.charge_customer && sale.payment_type == PaymentType::Credit {
        if let Some(customer_id) = &sale.customer_id {
            cashbook
                .customers()
                .update_balance(customer_id, sale.total_amount)
                .await?;
            info!(%customer_id, amount = %sale.total_amount, "Credit charged to customer");
        }
    }

    let rows = recorded.items.iter().map(|item| {
        let name = item
            .product
            .as_ref()
            .map(|p| p.name.clone())
            .or_else(|| {
                item.product_id
                    .as_ref()
                    .and_then(|id| products.iter().find(|p| &p.id == id))
                    .map(|p| p.name.clone())
            })
            .unwrap_or_else(|| render::EMPTY_CELL.to_string());
        vec![
            name,
            item.quantity.to_string(),
            item.unit_price.to_string(),
            item.total.to_string(),
        ]
    });
    writeln!(
        out,
        "{}",
        render::table(["Product", "Qty", "Unit Price", "Total"], rows, &[1, 2, 3])
    )?;
    writeln!(
        out,
        "Recorded sale {} for {} ({}, {})",
        recorded.sale.id,
        recorded.sale.total_amount,
        render::payment_type_badge(recorded.sale.payment_type),
        render::payment_status_badge(recorded.sale.payment_status)
    )?;
    Ok(recorded)
}
