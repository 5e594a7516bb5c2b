//! # Views
//!
//! One module per screen. Each view loads what it needs through the
//! [`Cashbook`](cashbook_store::Cashbook) client, computes derived values with
//! `cashbook_core::stats` and writes a table to the terminal.
//!
//! ## Failure Handling
//! ```text
//! load() ──► Ok ──► render()
//!   │
//!   └─► Err ──► error!(..) ──► "Failed to ..." ──► "Try again? [y/N]"
//!                                                    │y        │n
//!                                                    ▼         ▼
//!                                               load() again  Abandoned
//! ```
//! Only remote failures are offered a retry. Input errors are returned as-is.

pub mod account;
pub mod customers;
pub mod dashboard;
pub mod inventory;
pub mod reports;
pub mod sales;

use std::future::Future;
use std::io::{BufRead, Write};

use tracing::error;

use crate::error::{AppError, AppResult};

/// Prompt shown after a failed load.
pub const RETRY_PROMPT: &str = "Try again? [y/N] ";

/// Runs `load`, offering to rerun it from scratch while it fails.
///
/// `action` completes the sentence "Failed to ...".
pub async fn load_with_retry<T, F, Fut>(
    action: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
    mut load: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    loop {
        let err = match load().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        error!(error = %err, "Failed to {}", action);
        if !err.is_retryable() {
            return Err(err);
        }

        writeln!(out, "{}", err.user_message(action))?;
        if !confirm(input, out, RETRY_PROMPT)? {
            return Err(AppError::Abandoned);
        }
    }
}

/// Asks a yes/no question. Anything but `y`/`yes` (including EOF) is no.
pub fn confirm(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> AppResult<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use cashbook_store::{Cashbook, MemoryStore};
    use serde_json::json;

    /// A shop with three products, one of them low on stock, and two customers.
    pub fn shop() -> MemoryStore {
        MemoryStore::new()
            .with_rows(
                "products",
                vec![
                    json!({ "id": 1, "name": "Sugar 1kg", "price": 150, "stock_quantity": 20, "category": "Groceries" }),
                    json!({ "id": 2, "name": "Milk 500ml", "price": 60, "stock_quantity": 12, "category": "Dairy" }),
                    json!({ "id": 3, "name": "Bread", "price": 55, "stock_quantity": 4, "category": "Bakery" }),
                ],
            )
            .with_rows(
                "customers",
                vec![
                    json!({ "id": 1, "name": "Wanjiku", "phone": "0712345678", "current_balance": 450 }),
                    json!({ "id": 2, "name": "Otieno", "phone": null, "current_balance": 0 }),
                ],
            )
    }

    pub fn cashbook(store: &Arc<MemoryStore>) -> Cashbook {
        Cashbook::with_store(store.clone())
    }

    pub fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }
}
