//! # In-Memory Store
//!
//! A [`RemoteStore`] that keeps its tables in process. Used by tests and by
//! offline demos; it answers the same queries the hosted store does.
//!
//! ## What It Evaluates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  filters    eq / gt / gte / lt / lte                                   │
//! │             numbers compare numerically, text lexicographically        │
//! │                                                                        │
//! │  ordering   asc → nulls last, desc → nulls first                       │
//! │                                                                        │
//! │  embedding  alias:table(columns)                                       │
//! │             sales.customer_id ──► customers.id      (to-one)           │
//! │             sales.id ◄── sale_items.sale_id         (to-many)          │
//! │             neither visible → singular alias is to-one                 │
//! │                                                                        │
//! │  inserts    missing id → UUID, missing created_at → now (ms, Z)        │
//! │                                                                        │
//! │  procedures update_product_stock(product_id, quantity_sold)            │
//! │             update_customer_balance(customer_id, amount)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call is appended to a call log that tests inspect with
//! [`MemoryStore::calls`].

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{filter_timestamp, Filter, FilterOp, Query, RemoteStore};
use crate::error::{StoreError, StoreResult};
use cashbook_core::{AuthUser, Money};

type Row = Map<String, Value>;

/// One recorded call against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Select { table: String },
    Insert { table: String, rows: usize },
    Update { table: String },
    Rpc { function: String, args: Value },
    CurrentUser,
    UpdateUserMetadata,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Row>>,
    user: Option<AuthUser>,
    calls: Vec<StoreCall>,
}

/// In-process tables behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `table` with rows. Missing ids and timestamps are filled in.
    ///
    /// Values that are not JSON objects are skipped.
    pub fn with_rows(mut self, table: &str, rows: Vec<Value>) -> Self {
        let seeded: Vec<Row> = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(row) => Some(stamp(row)),
                _ => None,
            })
            .collect();
        self.state
            .get_mut()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(seeded);
        self
    }

    /// Signs a user in.
    pub fn with_user(mut self, user: AuthUser) -> Self {
        self.state.get_mut().user = Some(user);
        self
    }

    /// Current contents of `table`, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let state = self.state.lock().await;
        state
            .tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Calls made so far, oldest first.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Select {
            table: query.table.clone(),
        });

        let columns = parse_select(&query.select)?;
        let mut rows: Vec<&Row> = state
            .tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| matches_all(row, &query.filters)).collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let result = rows
            .into_iter()
            .map(|row| Value::Object(project(&state.tables, &query.table, row, &columns)))
            .collect::<Vec<_>>();
        debug!(table = %query.table, rows = result.len(), "Memory select");
        Ok(result)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> StoreResult<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Insert {
            table: table.to_string(),
            rows: rows.len(),
        });

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(row) = row else {
                return Err(StoreError::remote(400, format!("insert into {table}: row is not an object")));
            };
            inserted.push(stamp(row));
        }

        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted.into_iter().map(Value::Object).collect())
    }

    async fn update(&self, query: &Query, changes: Value) -> StoreResult<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Update {
            table: query.table.clone(),
        });

        let Value::Object(changes) = changes else {
            return Err(StoreError::remote(400, "update payload is not an object"));
        };

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(&query.table) {
            for row in rows.iter_mut().filter(|row| matches_all(row, &query.filters)) {
                for (key, value) in &changes {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }

        let columns = parse_select(&query.select)?;
        Ok(updated
            .iter()
            .map(|row| Value::Object(project(&state.tables, &query.table, row, &columns)))
            .collect())
    }

    async fn rpc(&self, function: &str, args: Value) -> StoreResult<Value> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::Rpc {
            function: function.to_string(),
            args: args.clone(),
        });

        match function {
            "update_product_stock" => {
                let id = required_arg(&args, "product_id")?;
                let sold = required_arg(&args, "quantity_sold")?
                    .as_i64()
                    .ok_or_else(|| StoreError::remote(400, "quantity_sold must be an integer"))?;
                let product = find_row_mut(&mut state.tables, "products", id)?;
                let stock = product
                    .get("stock_quantity")
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                product.insert("stock_quantity".to_string(), Value::from(stock - sold));
                Ok(Value::Null)
            }
            "update_customer_balance" => {
                let id = required_arg(&args, "customer_id")?;
                let amount = money_arg(required_arg(&args, "amount")?)?;
                let customer = find_row_mut(&mut state.tables, "customers", id)?;
                let balance = match customer.get("current_balance") {
                    Some(value) => money_arg(value)?,
                    None => Money::zero(),
                };
                let balance = serde_json::to_value(balance + amount)
                    .map_err(|e| StoreError::decode("current_balance", e))?;
                customer.insert("current_balance".to_string(), balance);
                Ok(Value::Null)
            }
            other => Err(StoreError::Remote {
                status: 404,
                code: Some("PGRST202".to_string()),
                message: format!("Could not find the function {other}"),
            }),
        }
    }

    async fn current_user(&self) -> StoreResult<Option<AuthUser>> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::CurrentUser);
        Ok(state.user.clone())
    }

    async fn update_user_metadata(&self, data: Value) -> StoreResult<Option<AuthUser>> {
        let mut state = self.state.lock().await;
        state.calls.push(StoreCall::UpdateUserMetadata);

        let user = state.user.as_mut().ok_or(StoreError::NotSignedIn)?;
        if let Value::Object(data) = data {
            user.user_metadata.extend(data);
        }
        Ok(Some(user.clone()))
    }
}

// =============================================================================
// Rows
// =============================================================================

/// Fills in `id` and `created_at` the way the hosted store's defaults do.
fn stamp(mut row: Row) -> Row {
    if row.get("id").map_or(true, Value::is_null) {
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    if row.get("created_at").map_or(true, Value::is_null) {
        row.insert("created_at".to_string(), Value::String(filter_timestamp(Utc::now())));
    }
    row
}

fn required_arg<'a>(args: &'a Value, name: &str) -> StoreResult<&'a Value> {
    args.get(name)
        .filter(|v| !v.is_null())
        .ok_or_else(|| StoreError::remote(400, format!("missing argument {name}")))
}

fn money_arg(value: &Value) -> StoreResult<Money> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::decode("amount", e))
}

fn find_row_mut<'a>(
    tables: &'a mut HashMap<String, Vec<Row>>,
    table: &str,
    id: &Value,
) -> StoreResult<&'a mut Row> {
    tables
        .get_mut(table)
        .and_then(|rows| rows.iter_mut().find(|row| row.get("id").is_some_and(|v| same_id(v, id))))
        .ok_or_else(|| StoreError::remote(404, format!("{table} row {} not found", value_text(id))))
}

/// Id equality across integer and text representations.
fn same_id(a: &Value, b: &Value) -> bool {
    a == b || (!a.is_null() && value_text(a) == value_text(b))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Filters & Ordering
// =============================================================================

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| matches(row.get(&filter.column), filter))
}

fn matches(value: Option<&Value>, filter: &Filter) -> bool {
    let ordering = match value {
        Some(Value::Number(n)) => match (n.as_f64(), filter.value.parse::<f64>()) {
            (Some(a), Ok(b)) => a.partial_cmp(&b),
            _ => None,
        },
        Some(Value::String(s)) => Some(s.as_str().cmp(filter.value.as_str())),
        Some(Value::Bool(b)) => {
            return filter.op == FilterOp::Eq && b.to_string() == filter.value;
        }
        _ => None,
    };

    let Some(ordering) = ordering else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => ordering == Ordering::Equal,
        FilterOp::Gt => ordering == Ordering::Greater,
        FilterOp::Gte => ordering != Ordering::Less,
        FilterOp::Lt => ordering == Ordering::Less,
        FilterOp::Lte => ordering != Ordering::Greater,
    }
}

/// Ascending order with nulls last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => value_text(x).cmp(&value_text(y)),
    }
}

// =============================================================================
// Select Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Column {
    All,
    Field { alias: String, name: String },
    Embed { alias: String, table: String, columns: Vec<Column> },
}

/// Parses `*, name, alias:table(col, nested:other(*))`.
fn parse_select(select: &str) -> StoreResult<Vec<Column>> {
    split_top_level(select)?
        .into_iter()
        .map(|part| parse_column(&part))
        .collect()
}

fn parse_column(part: &str) -> StoreResult<Column> {
    let part = part.trim();
    if part == "*" {
        return Ok(Column::All);
    }

    let (head, inner) = match part.find('(') {
        Some(open) => {
            let inner = part[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| invalid_select(part))?;
            (&part[..open], Some(inner))
        }
        None => (part, None),
    };

    let (alias, name) = match head.split_once(':') {
        Some((alias, name)) => (alias.trim(), name.trim()),
        None => (head.trim(), head.trim()),
    };
    if name.is_empty() {
        return Err(invalid_select(part));
    }

    Ok(match inner {
        Some(inner) => Column::Embed {
            alias: alias.to_string(),
            table: name.to_string(),
            columns: parse_select(inner)?,
        },
        None => Column::Field {
            alias: alias.to_string(),
            name: name.to_string(),
        },
    })
}

fn split_top_level(select: &str) -> StoreResult<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in select.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(|| invalid_select(select))?,
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if depth != 0 {
        return Err(invalid_select(select));
    }
    parts.push(current);

    Ok(parts.into_iter().filter(|p| !p.trim().is_empty()).collect())
}

fn invalid_select(select: &str) -> StoreError {
    StoreError::Remote {
        status: 400,
        code: Some("PGRST100".to_string()),
        message: format!("failed to parse select parameter ({select})"),
    }
}

/// `sale_items` → `sale_item`, `sales` → `sale`.
fn singular(table: &str) -> &str {
    table.strip_suffix('s').unwrap_or(table)
}

fn project(tables: &HashMap<String, Vec<Row>>, table: &str, row: &Row, columns: &[Column]) -> Row {
    let mut out = Row::new();
    for column in columns {
        match column {
            Column::All => out.extend(row.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Column::Field { alias, name } => {
                out.insert(alias.clone(), row.get(name).cloned().unwrap_or(Value::Null));
            }
            Column::Embed {
                alias,
                table: related,
                columns,
            } => {
                let related_rows = tables.get(related).map(Vec::as_slice).unwrap_or_default();
                let foreign_key = format!("{}_id", singular(related));
                let back_reference = format!("{}_id", singular(table));

                let to_one = row.contains_key(&foreign_key)
                    || (!related_rows.iter().any(|r| r.contains_key(&back_reference))
                        && singular(alias) == alias.as_str());

                let embedded = if to_one {
                    row.get(&foreign_key)
                        .filter(|fk| !fk.is_null())
                        .and_then(|fk| {
                            related_rows
                                .iter()
                                .find(|r| r.get("id").is_some_and(|id| same_id(id, fk)))
                        })
                        .map(|r| Value::Object(project(tables, related, r, columns)))
                        .unwrap_or(Value::Null)
                } else {
                    let id = row.get("id").cloned().unwrap_or(Value::Null);
                    Value::Array(
                        related_rows
                            .iter()
                            .filter(|r| r.get(&back_reference).is_some_and(|fk| same_id(fk, &id)))
                            .map(|r| Value::Object(project(tables, related, r, columns)))
                            .collect(),
                    )
                };
                out.insert(alias.clone(), embedded);
            }
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
