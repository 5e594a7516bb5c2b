//! Degraded-mode store used when no configuration is present.
//!
//! Every read comes back empty and every write returns nothing, so views
//! render their empty states instead of failing at startup.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Query, RemoteStore};
use crate::error::StoreResult;
use cashbook_core::AuthUser;

/// A store with no tables, no procedures and no signed-in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait]
impl RemoteStore for NoopStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Value>> {
        debug!(table = %query.table, "Degraded store: select returns no rows");
        Ok(Vec::new())
    }

    async fn insert(&self, table: &str, _rows: Vec<Value>) -> StoreResult<Vec<Value>> {
        debug!(table = %table, "Degraded store: insert ignored");
        Ok(Vec::new())
    }

    async fn update(&self, query: &Query, _changes: Value) -> StoreResult<Vec<Value>> {
        debug!(table = %query.table, "Degraded store: update ignored");
        Ok(Vec::new())
    }

    async fn rpc(&self, function: &str, _args: Value) -> StoreResult<Value> {
        debug!(function = %function, "Degraded store: procedure ignored");
        Ok(Value::Null)
    }

    async fn current_user(&self) -> StoreResult<Option<AuthUser>> {
        Ok(None)
    }

    async fn update_user_metadata(&self, _data: Value) -> StoreResult<Option<AuthUser>> {
        debug!("Degraded store: user metadata update ignored");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_everything_is_empty() {
        let store = NoopStore;

        assert!(store.select(&Query::table("products")).await.unwrap().is_empty());
        assert!(store
            .insert("sales", vec![json!({ "total_amount": 10 })])
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .update(&Query::table("products").eq("id", 1), json!({ "price": 5 }))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.rpc("update_product_stock", json!({})).await.unwrap(), Value::Null);
        assert!(store.current_user().await.unwrap().is_none());
        assert!(store
            .update_user_metadata(json!({ "role": "admin" }))
            .await
            .unwrap()
            .is_none());
    }
}
