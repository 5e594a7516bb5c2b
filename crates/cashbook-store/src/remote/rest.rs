//! # REST Store
//!
//! [`RemoteStore`] over HTTP, speaking the PostgREST table dialect and the
//! hosted auth API.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  select   GET    {url}/rest/v1/{table}?select=..&col=op.v&order=..     │
//! │  insert   POST   {url}/rest/v1/{table}          Prefer: return=repr.   │
//! │  update   PATCH  {url}/rest/v1/{table}?col=eq.v Prefer: return=repr.   │
//! │  rpc      POST   {url}/rest/v1/rpc/{function}                          │
//! │  user     GET    {url}/auth/v1/user                                    │
//! │  metadata PUT    {url}/auth/v1/user             {"data": {...}}        │
//! │                                                                         │
//! │  Every request: apikey: <anon key>                                     │
//! │                 Authorization: Bearer <access token or anon key>       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{Query, RemoteStore};
use crate::config::StoreConfig;
use crate::error::{ConfigError, StoreError, StoreResult};
use cashbook_core::AuthUser;

/// HTTP client for the hosted data store.
#[derive(Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestStore {
    /// Builds a client from a complete configuration.
    ///
    /// ## Errors
    /// `ConfigError::InvalidValue` when the URL or key is missing. Callers
    /// wanting degraded mode instead go through
    /// [`Cashbook::connect`](crate::Cashbook::connect).
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let (url, key) = config.credentials().ok_or_else(|| ConfigError::InvalidValue {
            key: "store".to_string(),
            reason: "url and anon key are both required".to_string(),
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("cashbook/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(url = %url, signed_in = config.access_token.is_some(), "Remote store client created");

        Ok(RestStore {
            http,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            anon_key: key.to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }

    /// A request carrying the key headers.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send_for_rows(&self, request: RequestBuilder, entity: &str) -> StoreResult<Vec<Value>> {
        let body = read_body(request.send().await?).await?;
        rows_from_body(entity, &body)
    }
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.access_token.is_some())
            .finish()
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Value>> {
        debug!(table = %query.table, params = ?query.to_params(), "GET rows");
        let request = self
            .request(Method::GET, &self.table_url(&query.table))
            .query(&query.to_params());
        self.send_for_rows(request, &query.table).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> StoreResult<Vec<Value>> {
        debug!(table = %table, rows = rows.len(), "POST rows");
        let request = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send_for_rows(request, table).await
    }

    async fn update(&self, query: &Query, changes: Value) -> StoreResult<Vec<Value>> {
        debug!(table = %query.table, params = ?query.to_params(), "PATCH rows");
        let request = self
            .request(Method::PATCH, &self.table_url(&query.table))
            .header("Prefer", "return=representation")
            .query(&query.to_params())
            .json(&changes);
        self.send_for_rows(request, &query.table).await
    }

    async fn rpc(&self, function: &str, args: Value) -> StoreResult<Value> {
        debug!(function = %function, "POST rpc");
        let request = self.request(Method::POST, &self.rpc_url(function)).json(&args);
        let body = read_body(request.send().await?).await?;
        value_from_body(function, &body)
    }

    async fn current_user(&self) -> StoreResult<Option<AuthUser>> {
        if self.access_token.is_none() {
            debug!("No access token; no signed-in user");
            return Ok(None);
        }

        let response = self.request(Method::GET, &self.user_url()).send().await?;
        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = response.status().as_u16(), "Access token rejected");
            return Ok(None);
        }

        let body = read_body(response).await?;
        let user = serde_json::from_slice(&body).map_err(|e| StoreError::decode("user", e))?;
        Ok(Some(user))
    }

    async fn update_user_metadata(&self, data: Value) -> StoreResult<Option<AuthUser>> {
        if self.access_token.is_none() {
            return Err(StoreError::NotSignedIn);
        }

        debug!("PUT user metadata");
        let request = self
            .request(Method::PUT, &self.user_url())
            .json(&json!({ "data": data }));
        let body = read_body(request.send().await?).await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| StoreError::decode("user", e))
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Error body shapes of the REST and auth APIs.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<Value>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    details: Option<String>,
}

/// Body of a 2xx response, or the error it describes.
async fn read_body(response: Response) -> StoreResult<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(error_from_body(status.as_u16(), &body))
    }
}

fn error_from_body(status: u16, body: &[u8]) -> StoreError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .map(|m| match &parsed.details {
            Some(details) if !details.is_empty() => format!("{m} ({details})"),
            _ => m,
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

    let code = parsed.code.map(|c| match c {
        Value::String(s) => s,
        other => other.to_string(),
    });

    StoreError::Remote {
        status,
        code,
        message,
    }
}

/// Empty and `null` bodies are no rows; a lone object is one row.
fn rows_from_body(entity: &str, body: &[u8]) -> StoreResult<Vec<Value>> {
    match value_from_body(entity, body)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(rows) => Ok(rows),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(StoreError::decode(
            entity,
            format!("expected rows, got {other}"),
        )),
    }
}

fn value_from_body(entity: &str, body: &[u8]) -> StoreResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| StoreError::decode(entity, e))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn store() -> RestStore {
        let config = StoreConfig::new(Url::parse("https://abc.example.co/").unwrap(), "anon");
        RestStore::new(&config).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let store = store();
        assert_eq!(store.table_url("products"), "https://abc.example.co/rest/v1/products");
        assert_eq!(
            store.rpc_url("update_product_stock"),
            "https://abc.example.co/rest/v1/rpc/update_product_stock"
        );
        assert_eq!(store.user_url(), "https://abc.example.co/auth/v1/user");
    }

    #[test]
    fn test_incomplete_config_is_rejected() {
        assert!(matches!(
            RestStore::new(&StoreConfig::default()),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn test_null_and_empty_bodies_are_no_rows() {
        assert!(rows_from_body("products", b"null").unwrap().is_empty());
        assert!(rows_from_body("products", b"").unwrap().is_empty());
        assert_eq!(rows_from_body("products", b"[{\"id\":1}]").unwrap().len(), 1);
        assert_eq!(rows_from_body("products", b"{\"id\":1}").unwrap().len(), 1);
        assert!(rows_from_body("products", b"42").is_err());
    }

    #[test]
    fn test_remote_error_body() {
        let err = error_from_body(
            404,
            br#"{"code":"PGRST202","message":"Could not find the function","details":"update_stock"}"#,
        );
        match err {
            StoreError::Remote {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("PGRST202"));
                assert_eq!(message, "Could not find the function (update_stock)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_auth_error_and_plain_text_bodies() {
        let err = error_from_body(401, br#"{"code":401,"msg":"invalid JWT"}"#);
        assert_eq!(err.to_string(), "Remote store returned 401: invalid JWT");

        let err = error_from_body(502, b"Bad Gateway\n");
        assert_eq!(err.to_string(), "Remote store returned 502: Bad Gateway");
    }

    #[tokio::test]
    async fn test_no_token_means_no_user_without_a_request() {
        let store = store();
        assert!(store.current_user().await.unwrap().is_none());
        assert!(matches!(
            store.update_user_metadata(json!({ "role": "admin" })).await,
            Err(StoreError::NotSignedIn)
        ));
    }
}
