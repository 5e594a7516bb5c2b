//! # Repository Module
//!
//! One repository per table group, each a thin translation from a small
//! parameter set to a [`Query`](crate::remote::Query) or procedure call.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  View                                                                   │
//! │       │  cashbook.sales().list(&filters)                                │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── list(&self, filters)        → Query + decode rows                 │
//! │  └── record(&self, sale, items)  → insert, insert, rpc × N             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Arc<dyn RemoteStore>  (REST / no-op / in-memory)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - product list, insert, update, stock procedure
//! - [`CustomerRepository`] - customer list, insert, balance procedure
//! - [`SaleRepository`] - filtered sale list, sale recording
//! - [`ReportRepository`] - sales, inventory and balance reports
//! - [`AuthRepository`] - signed-in user and role

pub mod auth;
pub mod customer;
pub mod product;
pub mod report;
pub mod sale;

pub use auth::AuthRepository;
pub use customer::CustomerRepository;
pub use product::ProductRepository;
pub use report::ReportRepository;
pub use sale::SaleRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use cashbook_core::CoreError;

pub const PRODUCTS: &str = "products";
pub const CUSTOMERS: &str = "customers";
pub const SALES: &str = "sales";
pub const SALE_ITEMS: &str = "sale_items";

/// Decodes every row, failing on the first that does not fit `T`.
pub(crate) fn decode_rows<T: DeserializeOwned>(entity: &str, rows: Vec<Value>) -> StoreResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| StoreError::decode(entity, e)))
        .collect()
}

/// The first returned row, if any.
pub(crate) fn decode_first<T: DeserializeOwned>(entity: &str, rows: Vec<Value>) -> StoreResult<Option<T>> {
    rows.into_iter()
        .next()
        .map(|row| serde_json::from_value(row).map_err(|e| StoreError::decode(entity, e)))
        .transpose()
}

pub(crate) fn to_payload<T: Serialize>(value: &T) -> StoreResult<Value> {
    Ok(serde_json::to_value(value).map_err(CoreError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_core::Customer;
    use serde_json::json;

    #[test]
    fn test_decode_first() {
        let rows = vec![
            json!({ "id": 1, "name": "Achieng" }),
            json!({ "id": 2, "name": "Kamau" }),
        ];
        let first: Option<Customer> = decode_first(CUSTOMERS, rows).unwrap();
        assert_eq!(first.unwrap().name, "Achieng");

        let none: Option<Customer> = decode_first(CUSTOMERS, Vec::new()).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_decode_rows_reports_bad_shape() {
        let err = decode_rows::<Customer>(CUSTOMERS, vec![json!({ "id": 1 })]).unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref entity, .. } if entity == "customers"));
    }
}
