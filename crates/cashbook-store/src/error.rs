//! # Store Error Types
//!
//! Error types for data-access operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / non-2xx response / bad JSON                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds status, remote code, table            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (in the CLI) ← Generic message + "Try again?"                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate retries. Every failure reaches the caller.

use thiserror::Error;

use cashbook_core::CoreError;

/// Data-access errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response.
    ///
    /// ## When This Occurs
    /// - Endpoint unreachable, DNS failure, TLS failure
    /// - Connection dropped mid-response
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with an error.
    ///
    /// ## When This Occurs
    /// - Invalid or expired key (401)
    /// - Unknown table, column or procedure (404 / 400)
    /// - Constraint violation inside a procedure (409 / 400)
    #[error("Remote store returned {status}: {message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A response body did not match the expected row shape.
    #[error("Failed to decode {entity}: {message}")]
    Decode { entity: String, message: String },

    /// An insert that must return a row returned none.
    ///
    /// ## When This Occurs
    /// - Recording a sale while running over the no-op store
    /// - Row-level security hiding the inserted row from the caller
    #[error("Insert into {table} returned no row")]
    EmptyInsert { table: String },

    /// The operation needs a signed-in user.
    #[error("No user is signed in")]
    NotSignedIn,

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing an export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Domain-level failure (e.g. CSV serialization).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    /// Creates a Decode error for a given entity.
    pub fn decode(entity: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StoreError::Decode {
            entity: entity.into(),
            message: err.to_string(),
        }
    }

    /// Creates a Remote error without a remote error code.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        StoreError::Remote {
            status,
            code: None,
            message: message.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to load config from {path}: {reason}")]
    LoadFailed { path: String, reason: String },
}

/// Result type for data-access operations.
pub type StoreResult<T> = Result<T, StoreError>;
