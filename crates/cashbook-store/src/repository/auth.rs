//! # Auth Repository
//!
//! The signed-in user and the `role` kept in their metadata. Sign-in itself
//! belongs to the hosted auth service; this client only reads the session
//! it is handed.

use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteStore;
use cashbook_core::{AuthUser, DEFAULT_ROLE};

#[derive(Clone)]
pub struct AuthRepository {
    store: Arc<dyn RemoteStore>,
}

impl AuthRepository {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        AuthRepository { store }
    }

    /// The signed-in user, or `None`.
    pub async fn current_user(&self) -> StoreResult<Option<AuthUser>> {
        self.store.current_user().await
    }

    /// The user's role, `"employee"` when unset or when nobody is signed in.
    pub async fn user_role(&self) -> StoreResult<String> {
        Ok(self
            .current_user()
            .await?
            .map(|user| user.role().to_string())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()))
    }

    /// Stores `role` in the signed-in user's metadata.
    ///
    /// Returns the updated user, or `None` from a store without an auth
    /// service (degraded mode).
    ///
    /// ## Errors
    /// [`StoreError::NotSignedIn`] when the store has an auth service but no
    /// session.
    pub async fn update_user_role(&self, role: &str) -> StoreResult<Option<AuthUser>> {
        let role = role.trim();
        if role.is_empty() {
            return Err(StoreError::Core(
                cashbook_core::ValidationError::Required {
                    field: "role".to_string(),
                }
                .into(),
            ));
        }

        info!(role = %role, "Updating user role");
        self.store.update_user_metadata(json!({ "role": role })).await
    }
}
