//! # App Error Type
//!
//! Unified error type for the views.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in CashBook                               │
//! │                                                                         │
//! │  View (dashboard, sales record, ...)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Form input invalid? ─── ValidationError ──┐                           │
//! │       │                                    │                           │
//! │       ▼                                    ▼                           │
//! │  Remote call failed? ─── StoreError ───► AppError                      │
//! │                                            │                           │
//! │                                            ├─► error!(...) full detail │
//! │                                            └─► user_message() generic  │
//! │                                                + "Try again? [y/N]"    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use cashbook_core::{CoreError, ValidationError};
use cashbook_store::{ConfigError, StoreError};

/// Errors a view can surface.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A referenced record is not in the loaded list.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The user declined to retry a failed load. The failure was already shown.
    #[error("Gave up after a failed load")]
    Abandoned,
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Store(StoreError::Config(err))
    }
}

impl AppError {
    /// Creates a not found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True for failures a retry might fix.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Store(StoreError::Http(_) | StoreError::Remote { .. } | StoreError::Decode { .. })
        )
    }

    /// What the user is told. Remote details stay in the log.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            AppError::Store(StoreError::NotSignedIn) => {
                "No user is signed in. Set CASHBOOK_ACCESS_TOKEN and try again.".to_string()
            }
            AppError::Store(StoreError::EmptyInsert { .. }) => {
                "The store did not save the record. Check that the store is configured.".to_string()
            }
            AppError::Store(StoreError::Config(err)) => format!("Configuration problem: {err}"),
            AppError::Store(StoreError::Io(err)) | AppError::Io(err) => {
                format!("Could not write to disk: {err}")
            }
            AppError::Core(CoreError::InvalidDateRange { .. } | CoreError::AmountOutOfRange(_)) => {
                self.to_string()
            }
            AppError::Validation(err)
            | AppError::Core(CoreError::Validation(err))
            | AppError::Store(StoreError::Core(CoreError::Validation(err))) => {
                format!("Invalid input: {err}")
            }
            AppError::NotFound { .. } | AppError::Abandoned => self.to_string(),
            AppError::Store(_) | AppError::Core(_) => {
                format!("Failed to {action}. Please check your connection and try again.")
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failures_get_the_generic_message() {
        let err = AppError::from(StoreError::remote(500, "relation \"sales\" does not exist"));
        assert!(err.is_retryable());
        assert_eq!(
            err.user_message("load dashboard data"),
            "Failed to load dashboard data. Please check your connection and try again."
        );
    }

    #[test]
    fn test_input_errors_are_not_retryable() {
        let err = AppError::from(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
        assert!(!err.is_retryable());
        assert!(err.user_message("record sale").starts_with("Invalid input"));

        let err = AppError::not_found("Product", 42);
        assert_eq!(err.user_message("record sale"), "Product not found: 42");
    }

    #[test]
    fn test_session_errors() {
        let err = AppError::from(StoreError::NotSignedIn);
        assert!(!err.is_retryable());
        assert!(err.user_message("update role").contains("CASHBOOK_ACCESS_TOKEN"));
    }
}
