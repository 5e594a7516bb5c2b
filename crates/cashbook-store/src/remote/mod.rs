//! # Remote Store
//!
//! The query interface of the hosted data store, behind a trait so the
//! repositories never know which backend answers them.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         dyn RemoteStore                                 │
//! │                                                                         │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐             │
//! │  │  RestStore    │   │  NoopStore    │   │  MemoryStore  │             │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │             │
//! │  │  reqwest      │   │  no rows      │   │  tables in a  │             │
//! │  │  /rest/v1     │   │  null results │   │  Mutex, call  │             │
//! │  │  /auth/v1     │   │  no user      │   │  log          │             │
//! │  └───────────────┘   └───────────────┘   └───────────────┘             │
//! │    configured          degraded mode       tests & demos               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Query Dialect
//! Queries render to PostgREST parameters:
//! ```text
//! Query::table("sales")
//!     .select("*, customer:customers(name, phone)")
//!     .gte("created_at", "2026-03-01T00:00:00.000Z")
//!     .order("created_at", false)
//!
//! → select=*, customer:customers(name, phone)
//!   created_at=gte.2026-03-01T00:00:00.000Z
//!   order=created_at.desc
//! ```

pub mod memory;
pub mod noop;
pub mod rest;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;

use crate::error::StoreResult;
use cashbook_core::AuthUser;

pub use memory::{MemoryStore, StoreCall};
pub use noop::NoopStore;
pub use rest::RestStore;

// =============================================================================
// RemoteStore Trait
// =============================================================================

/// Table, procedure and auth access to the remote data store.
///
/// Row payloads are JSON objects; the repositories decode them into the
/// domain types.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Rows of `query.table` matching the query. Never null: no rows is `[]`.
    async fn select(&self, query: &Query) -> StoreResult<Vec<Value>>;

    /// Inserts `rows` and returns the inserted rows as stored.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> StoreResult<Vec<Value>>;

    /// Applies `changes` to every row matching the query filters and returns
    /// the updated rows.
    async fn update(&self, query: &Query, changes: Value) -> StoreResult<Vec<Value>>;

    /// Invokes a remote procedure with named arguments.
    async fn rpc(&self, function: &str, args: Value) -> StoreResult<Value>;

    /// The signed-in user, or `None`.
    async fn current_user(&self) -> StoreResult<Option<AuthUser>>;

    /// Merges `data` into the signed-in user's metadata.
    ///
    /// `None` when the store has no auth service to update.
    async fn update_user_metadata(&self, data: Value) -> StoreResult<Option<AuthUser>>;
}

// =============================================================================
// Query
// =============================================================================

/// Comparison operators supported in row filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
        }
    }
}

/// One `column op value` condition. Values travel as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A filtered, ordered read (or the target of an update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    /// Select expression, including embedded relations.
    pub select: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    /// All columns of `table`, unfiltered.
    pub fn table(table: impl Into<String>) -> Self {
        Query {
            table: table.into(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl fmt::Display) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn gt(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Gt, value)
    }

    pub fn gte(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    pub fn lt(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Lt, value)
    }

    pub fn lte(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    /// Replaces the sort key.
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Query-string parameters in the PostgREST dialect.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 2);
        params.push(("select".to_string(), compact_select(&self.select)));
        for filter in &self.filters {
            params.push((
                filter.column.clone(),
                format!("{}.{}", filter.op.as_str(), filter.value),
            ));
        }
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        params
    }
}

/// Timestamp text used in `created_at` filters: millisecond precision, `Z`.
pub fn filter_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whitespace is not significant in select expressions; strip it so the
/// query string stays readable in logs.
fn compact_select(select: &str) -> String {
    select.chars().filter(|c| !c.is_whitespace()).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_params() {
        let query = Query::table("sales")
            .select("*, customer:customers(name, phone)")
            .gte("created_at", "2026-03-01T00:00:00.000Z")
            .eq("payment_status", "pending")
            .order("created_at", false);

        assert_eq!(
            query.to_params(),
            vec![
                ("select".to_string(), "*,customer:customers(name,phone)".to_string()),
                ("created_at".to_string(), "gte.2026-03-01T00:00:00.000Z".to_string()),
                ("payment_status".to_string(), "eq.pending".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_query_selects_everything() {
        let query = Query::table("products");
        assert_eq!(query.to_params(), vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_filter_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(filter_timestamp(at), "2026-03-31T23:59:59.999Z");
    }
}
