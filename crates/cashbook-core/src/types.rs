//! # Domain Types
//!
//! Row types mirrored from the remote data store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Remote Tables                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    products     │   │      sales      │   │   customers     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄┐ │  id             │ ┌►│  id             │       │
//! │  │  name           │ │ │  total_amount   │ │ │  name           │       │
//! │  │  price          │ │ │  payment_type   │ │ │  phone          │       │
//! │  │  stock_quantity │ │ │  payment_status │ │ │  current_balance│       │
//! │  │  category       │ │ │  customer_id ───┼─┘ └─────────────────┘       │
//! │  └─────────────────┘ │ └────────▲────────┘                             │
//! │                      │          │                                       │
//! │                      │ ┌────────┴────────┐                             │
//! │                      │ │   sale_items    │                             │
//! │                      │ │  ─────────────  │                             │
//! │                      │ │  sale_id        │                             │
//! │                      └─┼─ product_id     │                             │
//! │                        │  quantity       │                             │
//! │                        │  unit_price     │                             │
//! │                        │  total          │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are owned by the remote store. These types only describe what comes
//! back over the wire and what we send; they enforce no invariants.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::{DEFAULT_ROLE, LOW_STOCK_THRESHOLD};

// =============================================================================
// Record Id
// =============================================================================

/// Identifier issued by the remote store.
///
/// Tables may use UUID or integer keys; the id is echoed back exactly as it
/// arrived so filters and foreign keys match the column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer primary key.
    Int(i64),
    /// Text primary key (usually a UUID).
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "id".to_string(),
            });
        }
        Ok(s.parse::<i64>()
            .map(RecordId::Int)
            .unwrap_or_else(|_| RecordId::Text(s.to_string())))
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

// =============================================================================
// Payment Type / Status
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Paid on the spot.
    Cash,
    /// Sold on credit against a customer's balance.
    Credit,
    /// Any value this client does not know about, or null.
    #[serde(other)]
    #[default]
    Other,
}

impl PaymentType {
    /// Wire value used in filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Credit => "credit",
            PaymentType::Other => "other",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentType::Cash),
            "credit" => Ok(PaymentType::Credit),
            other => Err(ValidationError::InvalidFormat {
                field: "payment_type".to_string(),
                reason: format!("'{other}' is not one of: cash, credit"),
            }),
        }
    }
}

/// Whether a sale has been settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Settled.
    Paid,
    /// Outstanding credit to collect.
    Pending,
    /// Any value this client does not know about, or null.
    #[serde(other)]
    #[default]
    Other,
}

impl PaymentStatus {
    /// Wire value used in filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Other => "other",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "pending" => Ok(PaymentStatus::Pending),
            other => Err(ValidationError::InvalidFormat {
                field: "payment_status".to_string(),
                reason: format!("'{other}' is not one of: paid, pending"),
            }),
        }
    }
}

/// Reads a null column as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Product
// =============================================================================

/// A product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub price: Money,
    /// Units on hand. `None` when the column is null.
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Units on hand, treating a null column as zero.
    #[inline]
    pub fn stock(&self) -> i64 {
        self.stock_quantity.unwrap_or(0)
    }

    /// True when stock is strictly below [`LOW_STOCK_THRESHOLD`].
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock() < LOW_STOCK_THRESHOLD
    }

    /// Value of the units on hand at the current price, clamped at the
    /// i64 limits.
    pub fn stock_value(&self) -> Money {
        self.price.saturating_multiply_quantity(self.stock().max(0))
    }
}

/// Insert payload for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock_quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Partial update for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.stock_quantity.is_none()
            && self.category.is_none()
    }
}

/// Product columns embedded in a sale item (`product:products(...)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Amount the customer owes. Positive means outstanding credit.
    #[serde(default)]
    pub current_balance: Money,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// True when the customer owes money.
    #[inline]
    pub fn has_outstanding_balance(&self) -> bool {
        self.current_balance.is_positive()
    }
}

/// Insert payload for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub current_balance: Money,
}

/// Customer columns embedded in a sale (`customer:customers(name, phone)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item row.
///
/// Report queries select only `quantity, unit_price, total, product`, so the
/// key columns are optional and left out when serializing without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<RecordId>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Money,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub product: Option<ProductRef>,
}

/// Insert payload for a line item, before the sale id is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub product_id: RecordId,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

impl NewSaleItem {
    /// Builds a line item with `total = unit_price × quantity`.
    ///
    /// Fails when the total does not fit in i64 cents.
    pub fn new(product_id: RecordId, quantity: i64, unit_price: Money) -> CoreResult<Self> {
        Ok(NewSaleItem {
            product_id,
            quantity,
            unit_price,
            total: unit_price.multiply_quantity(quantity)?,
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale row, optionally with its customer and items embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: RecordId,
    #[serde(default)]
    pub total_amount: Money,
    /// Null or missing reads as [`PaymentType::Other`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_type: PaymentType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub customer_id: Option<RecordId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub sale_items: Vec<SaleItem>,
}

impl Sale {
    /// True when the sale still has money to collect.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }

    /// Customer name for display, falling back to a walk-in label.
    pub fn customer_name(&self) -> &str {
        self.customer
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Walk-in Customer")
    }
}

/// Insert payload for a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub total_amount: Money,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<RecordId>,
}

impl NewSale {
    /// Builds a sale whose total is the sum of the line totals.
    ///
    /// Cash sales are recorded as paid, credit sales as pending.
    pub fn from_items(
        items: &[NewSaleItem],
        payment_type: PaymentType,
        customer_id: Option<RecordId>,
    ) -> CoreResult<Self> {
        let payment_status = match payment_type {
            PaymentType::Credit => PaymentStatus::Pending,
            _ => PaymentStatus::Paid,
        };
        let total_amount = items
            .iter()
            .try_fold(Money::zero(), |total, item| total.checked_add(item.total))?;
        Ok(NewSale {
            total_amount,
            payment_type,
            payment_status,
            customer_id,
        })
    }
}

/// Result of recording a sale: the sale row and the inserted line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Auth User
// =============================================================================

/// A user as reported by the remote auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl AuthUser {
    /// The `role` stored in user metadata, or [`DEFAULT_ROLE`].
    pub fn role(&self) -> &str {
        self.user_metadata
            .get("role")
            .and_then(|v| v.as_str())
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE)
    }
}

// =============================================================================
// Query Filters
// =============================================================================

/// Optional filters for listing sales.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleFilters {
    /// Inclusive lower bound on `created_at`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end: Option<DateTime<Utc>>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_type: Option<PaymentType>,
}

/// Optional filters applied on top of a report's date range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilters {
    pub payment_type: Option<PaymentType>,
    pub payment_status: Option<PaymentStatus>,
}

/// An inclusive `created_at` range for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range, rejecting one that ends before it starts.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// Covers whole calendar days (UTC): from the start of `first` through
    /// the last millisecond of `last`.
    pub fn for_days(first: NaiveDate, last: NaiveDate) -> Result<Self, CoreError> {
        let start = first.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = last.and_time(chrono::NaiveTime::MIN).and_utc() + Duration::days(1)
            - Duration::milliseconds(1);
        DateRange::new(start, end)
    }

    /// True when `at` falls inside the range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
