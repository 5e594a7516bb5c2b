//! Inventory: the product table, plus adding and editing products.

use std::io::{BufRead, Write};

use cashbook_core::stats::InventorySummary;
use cashbook_core::validation::{validate_name, validate_new_product, validate_price, validate_stock};
use cashbook_core::{NewProduct, Product, ProductUpdate, RecordId, ValidationError};
use cashbook_store::Cashbook;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::render;
use crate::views::load_with_retry;

/// Marker shown next to products below the low-stock threshold.
pub const LOW_STOCK_MARKER: &str = "LOW";

pub async fn load(cashbook: &Cashbook) -> AppResult<Vec<Product>> {
    Ok(cashbook.products().list().await?)
}

pub fn render(products: &[Product], out: &mut impl Write) -> AppResult<()> {
    render::heading(out, "Inventory")?;
    if products.is_empty() {
        writeln!(out, "No products found.")?;
        return Ok(());
    }

    let rows = products.iter().map(|product| {
        vec![
            product.id.to_string(),
            product.name.clone(),
            render::optional(product.category.as_deref()),
            product.price.to_string(),
            product.stock().to_string(),
            if product.is_low_stock() { LOW_STOCK_MARKER } else { "" }.to_string(),
        ]
    });
    writeln!(
        out,
        "{}",
        render::table(["ID", "Name", "Category", "Price", "Stock", ""], rows, &[3, 4])
    )?;

    let summary = InventorySummary::compute(products);
    render::stat_line(out, "Products", summary.product_count)?;
    render::stat_line(out, "Low Stock", summary.low_stock_items)?;
    render::stat_line(out, "Out of Stock", summary.out_of_stock_items)?;
    render::stat_line(out, "Stock Value", summary.stock_value)?;
    Ok(())
}

pub async fn run(cashbook: &Cashbook, input: &mut impl BufRead, out: &mut impl Write) -> AppResult<()> {
    let products = load_with_retry("load products", input, out, || load(cashbook)).await?;
    render(&products, out)
}

/// Validates and inserts a product.
pub async fn add(cashbook: &Cashbook, product: NewProduct, out: &mut impl Write) -> AppResult<()> {
    validate_new_product(&product)?;

    match cashbook.products().insert(&product).await? {
        Some(added) => {
            info!(id = %added.id, name = %added.name, "Product added");
            writeln!(out, "Added {} (ID {}) at {}", added.name, added.id, added.price)?;
        }
        None => writeln!(out, "The store returned no row; {} was not saved.", product.name)?,
    }
    Ok(())
}

/// Validates and applies a partial product update.
pub async fn update(
    cashbook: &Cashbook,
    id: &RecordId,
    changes: ProductUpdate,
    out: &mut impl Write,
) -> AppResult<()> {
    if changes.is_empty() {
        return Err(ValidationError::Required {
            field: "changes".to_string(),
        }
        .into());
    }
    if let Some(name) = &changes.name {
        validate_name("name", name)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }
    if let Some(stock) = changes.stock_quantity {
        validate_stock(stock)?;
    }

    let updated = cashbook
        .products()
        .update(id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    info!(id = %updated.id, "Product updated");
    writeln!(
        out,
        "Updated {} (ID {}): {} at {}, {} in stock",
        updated.name,
        updated.id,
        render::optional(updated.category.as_deref()),
        updated.price,
        updated.stock()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use cashbook_core::Money;

    use super::*;
    use crate::views::test_support::{cashbook, output, shop};

    #[tokio::test]
    async fn test_render_marks_low_stock_and_summarises() {
        let store = Arc::new(shop());
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        run(&cashbook(&store), &mut input, &mut out).await.unwrap();

        let printed = output(out);
        assert_eq!(printed.matches(LOW_STOCK_MARKER).count(), 1);
        // 150*20 + 60*12 + 55*4
        assert!(printed.contains("KSh 3,940.00"));
    }

    #[tokio::test]
    async fn test_add_validates_before_inserting() {
        let store = Arc::new(shop());
        let mut out = Vec::new();

        let err = add(
            &cashbook(&store),
            NewProduct {
                name: "  ".to_string(),
                price: Money::from_major(10),
                stock_quantity: 1,
                category: None,
            },
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.calls().await.is_empty());

        add(
            &cashbook(&store),
            NewProduct {
                name: "Cooking Oil 1L".to_string(),
                price: Money::from_major(320),
                stock_quantity: 6,
                category: Some("Groceries".to_string()),
            },
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(store.rows("products").await.len(), 4);
        assert!(output(out).contains("Added Cooking Oil 1L"));
    }

    #[tokio::test]
    async fn test_update_requires_changes_and_an_existing_product() {
        let store = Arc::new(shop());
        let mut out = Vec::new();

        let err = update(&cashbook(&store), &RecordId::Int(1), ProductUpdate::default(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let changes = ProductUpdate {
            stock_quantity: Some(40),
            ..Default::default()
        };
        let err = update(&cashbook(&store), &RecordId::Int(404), changes.clone(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        update(&cashbook(&store), &RecordId::Int(3), changes, &mut out)
            .await
            .unwrap();
        assert_eq!(store.rows("products").await[2]["stock_quantity"], 40);
    }

    #[tokio::test]
    async fn test_degraded_add_reports_nothing_saved() {
        let mut out = Vec::new();
        add(
            &Cashbook::degraded(),
            NewProduct {
                name: "Salt 500g".to_string(),
                price: Money::from_major(30),
                stock_quantity: 60,
                category: None,
            },
            &mut out,
        )
        .await
        .unwrap();
        assert!(output(out).contains("was not saved"));
    }
}
