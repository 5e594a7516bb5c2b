//! # Customer Repository
//!
//! Remote operations on the `customers` table and the balance procedure.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{decode_first, decode_rows, to_payload, CUSTOMERS};
use crate::error::StoreResult;
use crate::remote::{Query, RemoteStore};
use cashbook_core::{Customer, Money, NewCustomer, RecordId};

/// Repository for customer operations.
#[derive(Clone)]
pub struct CustomerRepository {
    store: Arc<dyn RemoteStore>,
}

impl CustomerRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        CustomerRepository { store }
    }

    /// All customers ordered by name.
    pub async fn list(&self) -> StoreResult<Vec<Customer>> {
        let query = Query::table(CUSTOMERS).order("name", true);
        let customers: Vec<Customer> = decode_rows(CUSTOMERS, self.store.select(&query).await?)?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Inserts a customer and returns the stored row, or `None`.
    pub async fn insert(&self, customer: &NewCustomer) -> StoreResult<Option<Customer>> {
        info!(name = %customer.name, "Inserting customer");
        let rows = self.store.insert(CUSTOMERS, vec![to_payload(customer)?]).await?;
        decode_first(CUSTOMERS, rows)
    }

    /// Calls `update_customer_balance(customer_id, amount)`.
    ///
    /// A positive amount adds to what the customer owes; a negative amount
    /// records a repayment. The arithmetic happens in the procedure.
    pub async fn update_balance(&self, id: &RecordId, amount: Money) -> StoreResult<Value> {
        info!(customer_id = %id, amount = %amount, "Adjusting customer balance");
        self.store
            .rpc(
                "update_customer_balance",
                json!({ "customer_id": id, "amount": amount }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryStore, MockRemoteStore};

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let store = MemoryStore::new().with_rows(
            CUSTOMERS,
            vec![
                json!({ "name": "Otieno", "current_balance": 0 }),
                json!({ "name": "Akinyi", "current_balance": null }),
                json!({ "name": "Mwangi", "phone": "0722111222", "current_balance": 450 }),
            ],
        );
        let customers = CustomerRepository::new(Arc::new(store)).list().await.unwrap();

        let names: Vec<&str> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Akinyi", "Mwangi", "Otieno"]);
        assert!(customers[0].current_balance.is_zero());
    }

    #[tokio::test]
    async fn test_insert_payload() {
        let mut mock = MockRemoteStore::new();
        mock.expect_insert()
            .withf(|table: &str, rows: &Vec<Value>| {
                table == "customers"
                    && *rows == vec![json!({ "name": "Njeri", "phone": "0700000001", "current_balance": 0 })]
            })
            .times(1)
            .returning(|_, rows| {
                let mut row = rows[0].clone();
                row["id"] = json!(11);
                Ok(vec![row])
            });

        let customer = CustomerRepository::new(Arc::new(mock))
            .insert(&NewCustomer {
                name: "Njeri".to_string(),
                phone: Some("0700000001".to_string()),
                current_balance: Money::zero(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.id, RecordId::Int(11));
    }

    #[tokio::test]
    async fn test_update_balance_sends_decimal_amount() {
        let mut mock = MockRemoteStore::new();
        mock.expect_rpc()
            .withf(|function: &str, args: &Value| {
                function == "update_customer_balance"
                    && *args == json!({ "customer_id": 4, "amount": -150.25 })
            })
            .times(1)
            .returning(|_, _| Ok(Value::Null));

        CustomerRepository::new(Arc::new(mock))
            .update_balance(&RecordId::Int(4), Money::from_cents(-15025))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_balance_applies_in_memory() {
        let store = Arc::new(MemoryStore::new().with_rows(
            CUSTOMERS,
            vec![json!({ "id": 1, "name": "Mwangi", "current_balance": 450 })],
        ));
        let repo = CustomerRepository::new(store.clone());

        repo.update_balance(&RecordId::Int(1), Money::from_major(-200))
            .await
            .unwrap();

        let customers = repo.list().await.unwrap();
        assert_eq!(customers[0].current_balance, Money::from_major(250));
    }
}
