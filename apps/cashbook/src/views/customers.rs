//! Customers: the customer table with outstanding credit.

use std::io::{BufRead, Write};

use cashbook_core::stats::CreditSummary;
use cashbook_core::validation::validate_new_customer;
use cashbook_core::{Customer, Money, NewCustomer, RecordId, ValidationError};
use cashbook_store::Cashbook;
use tracing::info;

use crate::error::AppResult;
use crate::render;
use crate::views::load_with_retry;

pub async fn load(cashbook: &Cashbook) -> AppResult<Vec<Customer>> {
    Ok(cashbook.customers().list().await?)
}

pub fn render(customers: &[Customer], out: &mut impl Write) -> AppResult<()> {
    render::heading(out, "Customers")?;
    if customers.is_empty() {
        writeln!(out, "No customers found.")?;
        return Ok(());
    }

    let rows = customers.iter().map(|customer| {
        vec![
            customer.id.to_string(),
            customer.name.clone(),
            render::optional(customer.phone.as_deref()),
            customer.current_balance.to_string(),
        ]
    });
    writeln!(out, "{}", render::table(["ID", "Name", "Phone", "Balance"], rows, &[3]))?;

    let credit = CreditSummary::compute(customers);
    render::stat_line(out, "Owing Customers", credit.customers_with_balance)?;
    render::stat_line(out, "Outstanding Credit", credit.total_outstanding)?;
    Ok(())
}

pub async fn run(cashbook: &Cashbook, input: &mut impl BufRead, out: &mut impl Write) -> AppResult<()> {
    let customers = load_with_retry("load customers", input, out, || load(cashbook)).await?;
    render(&customers, out)
}

/// Validates and inserts a customer.
pub async fn add(cashbook: &Cashbook, customer: NewCustomer, out: &mut impl Write) -> AppResult<()> {
    validate_new_customer(&customer)?;

    match cashbook.customers().insert(&customer).await? {
        Some(added) => {
            info!(id = %added.id, "Customer added");
            writeln!(out, "Added {} (ID {})", added.name, added.id)?;
        }
        None => writeln!(out, "The store returned no row; {} was not saved.", customer.name)?,
    }
    Ok(())
}

/// Adds `amount` to a customer's balance. Negative amounts record a payment.
pub async fn adjust_balance(
    cashbook: &Cashbook,
    id: &RecordId,
    amount: Money,
    out: &mut impl Write,
) -> AppResult<()> {
    if amount.is_zero() {
        return Err(ValidationError::Required {
            field: "amount".to_string(),
        }
        .into());
    }

    cashbook.customers().update_balance(id, amount).await?;
    info!(%id, %amount, "Customer balance adjusted");
    writeln!(out, "Adjusted balance of customer {id} by {amount}")?;
    Ok(())
}
