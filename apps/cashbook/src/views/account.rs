//! Account: who is signed in and their role.

use std::io::{BufRead, Write};

use cashbook_core::validation::validate_name;
use cashbook_core::AuthUser;
use cashbook_store::Cashbook;

use crate::error::AppResult;
use crate::render;
use crate::views::load_with_retry;

pub async fn load(cashbook: &Cashbook) -> AppResult<Option<AuthUser>> {
    Ok(cashbook.auth().current_user().await?)
}

pub fn render(user: Option<&AuthUser>, out: &mut impl Write) -> AppResult<()> {
    let Some(user) = user else {
        writeln!(out, "Not signed in. Set CASHBOOK_ACCESS_TOKEN to use an account.")?;
        return Ok(());
    };

    render::heading(out, "Account")?;
    render::stat_line(out, "User", &user.id)?;
    render::stat_line(out, "Email", render::optional(user.email.as_deref()))?;
    render::stat_line(out, "Role", user.role())?;
    Ok(())
}

pub async fn whoami(cashbook: &Cashbook, input: &mut impl BufRead, out: &mut impl Write) -> AppResult<()> {
    let user = load_with_retry("load the current user", input, out, || load(cashbook)).await?;
    render(user.as_ref(), out)
}

pub async fn set_role(cashbook: &Cashbook, role: &str, out: &mut impl Write) -> AppResult<()> {
    validate_name("role", role)?;

    match cashbook.auth().update_user_role(role).await? {
        Some(user) => writeln!(
            out,
            "Role for {} is now {}",
            user.email.as_deref().unwrap_or(&user.id),
            user.role()
        )?,
        None => writeln!(out, "Role was not saved: no account service is configured.")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use cashbook_store::{MemoryStore, StoreError};

    use super::*;
    use crate::error::AppError;
    use crate::views::test_support::output;

    fn signed_in() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_user(AuthUser {
            id: "u-1".to_string(),
            email: Some("duka@example.co.ke".to_string()),
            user_metadata: Default::default(),
        }))
    }

    #[tokio::test]
    async fn test_whoami_shows_default_role() {
        let store = signed_in();
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        whoami(&Cashbook::with_store(store), &mut input, &mut out)
            .await
            .unwrap();

        let printed = output(out);
        assert!(printed.contains("duka@example.co.ke"));
        assert!(printed.contains("employee"));
    }

    #[tokio::test]
    async fn test_set_role_updates_metadata() {
        let store = signed_in();
        let cashbook = Cashbook::with_store(store.clone());
        let mut out = Vec::new();

        set_role(&cashbook, "admin", &mut out).await.unwrap();
        assert_eq!(cashbook.auth().user_role().await.unwrap(), "admin");
        assert!(output(out).contains("now admin"));
    }

    #[tokio::test]
    async fn test_degraded() {
        let cashbook = Cashbook::degraded();
        let mut input = Cursor::new("");
        let mut out = Vec::new();

        whoami(&cashbook, &mut input, &mut out).await.unwrap();
        assert!(output(out).contains("Not signed in"));

        let mut out = Vec::new();
        set_role(&cashbook, "admin", &mut out).await.unwrap();
        assert!(output(out).contains("Role was not saved"));

        let err = set_role(&cashbook, " ", &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_role_without_session() {
        let cashbook = Cashbook::with_store(Arc::new(MemoryStore::new()));
        let err = set_role(&cashbook, "admin", &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::NotSignedIn)));
    }
}
