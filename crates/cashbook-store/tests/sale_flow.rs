//! End-to-end data-access flows over the in-memory store.

use std::sync::Arc;

use cashbook_core::stats::{recent_sales, DashboardStats};
use cashbook_core::{
    DateRange, Money, NewCustomer, NewProduct, NewSale, NewSaleItem, PaymentType, RecordId,
    ReportFilters, SaleFilters, RECENT_SALES_LIMIT,
};
use cashbook_store::remote::StoreCall;
use cashbook_store::{export_csv, Cashbook, MemoryStore, StoreError};
use chrono::{Duration, Utc};
use serde_json::json;

fn shop() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new().with_rows(
            "products",
            vec![
                json!({ "id": 1, "name": "Sugar 1kg", "price": 150, "stock_quantity": 20, "category": "Groceries" }),
                json!({ "id": 2, "name": "Milk 500ml", "price": 60, "stock_quantity": 12, "category": "Dairy" }),
                json!({ "id": 3, "name": "Bread", "price": 55, "stock_quantity": 9, "category": "Bakery" }),
            ],
        ),
    )
}

fn items(lines: &[(i64, i64, i64)]) -> Vec<NewSaleItem> {
    lines
        .iter()
        .map(|&(id, qty, price)| NewSaleItem::new(RecordId::Int(id), qty, Money::from_major(price)).unwrap())
        .collect()
}

#[tokio::test]
async fn record_sale_makes_one_insert_per_table_and_one_rpc_per_item() {
    let store = shop();
    let cashbook = Cashbook::with_store(store.clone());

    let lines = items(&[(1, 2, 150), (2, 3, 60), (3, 1, 55)]);
    let sale = NewSale::from_items(&lines, PaymentType::Cash, None).unwrap();
    let recorded = cashbook.sales().record(&sale, &lines).await.unwrap();

    assert_eq!(recorded.sale.total_amount, Money::from_major(535));
    assert_eq!(recorded.items.len(), 3);

    let calls = store.calls().await;
    let inserts: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            StoreCall::Insert { table, rows } => Some((table.as_str(), *rows)),
            _ => None,
        })
        .collect();
    assert_eq!(inserts, vec![("sales", 1), ("sale_items", 3)]);

    let rpcs = calls
        .iter()
        .filter(|c| matches!(c, StoreCall::Rpc { function, .. } if function == "update_product_stock"))
        .count();
    assert_eq!(rpcs, 3);

    let stock: Vec<i64> = cashbook
        .reports()
        .inventory()
        .await
        .unwrap()
        .iter()
        .map(|p| p.stock())
        .collect();
    assert_eq!(stock, vec![8, 9, 18]);
}

#[tokio::test]
async fn failure_at_item_k_keeps_earlier_stock_updates() {
    let store = shop();
    let cashbook = Cashbook::with_store(store.clone());

    // Product 99 does not exist, so the second stock update fails.
    let lines = items(&[(1, 5, 150), (99, 1, 10), (2, 4, 60)]);
    let sale = NewSale::from_items(&lines, PaymentType::Cash, None).unwrap();
    let err = cashbook.sales().record(&sale, &lines).await.unwrap_err();
    assert!(matches!(err, StoreError::Remote { status: 404, .. }));

    let products = store.rows("products").await;
    assert_eq!(products[0]["stock_quantity"], 15);
    assert_eq!(products[1]["stock_quantity"], 12);

    // The sale and its items stay behind.
    assert_eq!(store.rows("sales").await.len(), 1);
    assert_eq!(store.rows("sale_items").await.len(), 3);
}

#[tokio::test]
async fn degraded_client_returns_empty_results() {
    let cashbook = Cashbook::degraded();

    assert!(cashbook.products().list().await.unwrap().is_empty());
    assert!(cashbook.customers().list().await.unwrap().is_empty());
    assert!(cashbook.sales().list(&SaleFilters::default()).await.unwrap().is_empty());
    assert!(cashbook.reports().inventory().await.unwrap().is_empty());
    assert!(cashbook.reports().customer_balances().await.unwrap().is_empty());

    let added = cashbook
        .customers()
        .insert(&NewCustomer {
            name: "Achieng".to_string(),
            phone: None,
            current_balance: Money::zero(),
        })
        .await
        .unwrap();
    assert!(added.is_none());

    let lines = items(&[(1, 1, 150)]);
    let sale = NewSale::from_items(&lines, PaymentType::Cash, None).unwrap();
    assert!(matches!(
        cashbook.sales().record(&sale, &lines).await,
        Err(StoreError::EmptyInsert { .. })
    ));
}

#[tokio::test]
async fn dashboard_and_report_export_over_recorded_sales() {
    let store = shop();
    let cashbook = Cashbook::with_store(store.clone());

    let customer = cashbook
        .customers()
        .insert(&NewCustomer {
            name: "Wanjiku".to_string(),
            phone: Some("0712345678".to_string()),
            current_balance: Money::zero(),
        })
        .await
        .unwrap()
        .unwrap();

    let cash = items(&[(1, 1, 150)]);
    cashbook
        .sales()
        .record(&NewSale::from_items(&cash, PaymentType::Cash, None).unwrap(), &cash)
        .await
        .unwrap();

    let credit = items(&[(2, 1, 60)]);
    let credit_sale = NewSale::from_items(&credit, PaymentType::Credit, Some(customer.id.clone())).unwrap();
    cashbook.sales().record(&credit_sale, &credit).await.unwrap();
    cashbook
        .customers()
        .update_balance(&customer.id, credit_sale.total_amount)
        .await
        .unwrap();

    let sales = cashbook.sales().list(&SaleFilters::default()).await.unwrap();
    let customers = cashbook.customers().list().await.unwrap();
    let products = cashbook.products().list().await.unwrap();
    let stats = DashboardStats::compute(&sales, &customers, &products);

    assert_eq!(stats.total_sales, Money::from_major(210));
    assert_eq!(stats.pending_payments, Money::from_major(60));
    assert_eq!(stats.low_stock_items, 1);
    assert_eq!(stats.total_customers, 1);
    assert_eq!(recent_sales(&sales, RECENT_SALES_LIMIT).len(), 2);

    let balances = cashbook.reports().customer_balances().await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].current_balance, Money::from_major(60));

    let now = Utc::now();
    let range = DateRange::new(now - Duration::hours(1), now + Duration::hours(1)).unwrap();
    let report = cashbook
        .reports()
        .sales(&range, &ReportFilters::default())
        .await
        .unwrap();
    assert_eq!(report.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = export_csv(&report, dir.path(), "sales-report").unwrap().unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.starts_with("id,total_amount,payment_type,payment_status,customer_id,created_at,customer,sale_items"));
    assert_eq!(content.lines().count(), 3);
}

#[tokio::test]
async fn product_insert_and_update_round_through_the_store() {
    let cashbook = Cashbook::with_store(shop());

    let added = cashbook
        .products()
        .insert(&NewProduct {
            name: "Cooking Oil 1L".to_string(),
            price: Money::from_major(320),
            stock_quantity: 6,
            category: Some("Groceries".to_string()),
        })
        .await
        .unwrap()
        .unwrap();

    let updated = cashbook
        .products()
        .update(
            &added.id,
            &cashbook_core::ProductUpdate {
                stock_quantity: Some(30),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.stock(), 30);
    assert_eq!(updated.name, "Cooking Oil 1L");

    let missing = cashbook
        .products()
        .update(&RecordId::Int(404), &Default::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}
