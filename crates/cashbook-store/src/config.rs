//! # Store Configuration
//!
//! Where the remote data store lives and how to authenticate against it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CASHBOOK_STORE_URL=https://abc.example.co                          │
//! │     CASHBOOK_STORE_ANON_KEY=eyJhbGciOi...                              │
//! │     CASHBOOK_ACCESS_TOKEN=eyJhbGciOi...   (optional, signed-in user)   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $CASHBOOK_CONFIG, or                                               │
//! │     ~/.config/cashbook/cashbook.toml (Linux)                           │
//! │     ~/Library/Application Support/com.cashbook.cashbook/... (macOS)    │
//! │                                                                         │
//! │  3. Nothing (lowest priority)                                          │
//! │     → client runs over the no-op store                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! url = "https://abc.example.co"
//! anon_key = "eyJhbGciOi..."
//! ```
//!
//! Blank values count as absent. A URL that does not parse is an error, not
//! a silent downgrade.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;

pub const ENV_URL: &str = "CASHBOOK_STORE_URL";
pub const ENV_ANON_KEY: &str = "CASHBOOK_STORE_ANON_KEY";
pub const ENV_ACCESS_TOKEN: &str = "CASHBOOK_ACCESS_TOKEN";
pub const ENV_CONFIG_PATH: &str = "CASHBOOK_CONFIG";

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "cashbook.toml";

// =============================================================================
// Store Configuration
// =============================================================================

/// Connection settings for the remote data store.
///
/// Passed explicitly to [`Cashbook::connect`](crate::Cashbook::connect).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL of the store (`https://<project>.example.co`).
    pub url: Option<Url>,
    /// Anonymous (public) API key.
    pub anon_key: Option<String>,
    /// Access token of a signed-in user, for auth calls.
    pub access_token: Option<String>,
}

impl StoreConfig {
    /// Creates a complete configuration.
    pub fn new(url: Url, anon_key: impl Into<String>) -> Self {
        StoreConfig {
            url: Some(url),
            anon_key: Some(anon_key.into()),
            access_token: None,
        }
    }

    /// Sets the signed-in user's access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = non_blank(Some(token.into()));
        self
    }

    /// URL and key, when both are present.
    pub fn credentials(&self) -> Option<(&Url, &str)> {
        match (&self.url, &self.anon_key) {
            (Some(url), Some(key)) => Some((url, key.as_str())),
            _ => None,
        }
    }

    /// True when the client can talk to a real store.
    pub fn is_complete(&self) -> bool {
        self.credentials().is_some()
    }

    /// Fields set in `overrides` replace ours.
    pub fn merge(self, overrides: StoreConfig) -> StoreConfig {
        StoreConfig {
            url: overrides.url.or(self.url),
            anon_key: overrides.anon_key.or(self.anon_key),
            access_token: overrides.access_token.or(self.access_token),
        }
    }

    // -------------------------------------------------------------------------
    // Sources
    // -------------------------------------------------------------------------

    /// Reads the environment variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(StoreConfig {
            url: parse_url(ENV_URL, non_blank(lookup(ENV_URL)))?,
            anon_key: non_blank(lookup(ENV_ANON_KEY)),
            access_token: non_blank(lookup(ENV_ACCESS_TOKEN)),
        })
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parses the `[store]` table of a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::LoadFailed {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        Ok(StoreConfig {
            url: parse_url("store.url", non_blank(file.store.url))?,
            anon_key: non_blank(file.store.anon_key),
            access_token: non_blank(file.store.access_token),
        })
    }

    /// Reads a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::LoadFailed { reason, .. } => ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Loads file then environment, environment winning.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = non_blank(std::env::var(ENV_CONFIG_PATH).ok()).map(PathBuf::from);
        Self::load_with(|key| std::env::var(key).ok(), explicit.or_else(default_path))
    }

    /// [`load`](Self::load) with injectable sources.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load_with(
        lookup: impl Fn(&str) -> Option<String>,
        file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let from_file = match file {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading store configuration file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(path = %path.display(), "No configuration file");
                StoreConfig::default()
            }
            None => StoreConfig::default(),
        };

        Ok(from_file.merge(Self::from_lookup(lookup)?))
    }
}

/// Keys and tokens never reach the logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Platform config file location.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "cashbook", "cashbook")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    store: StoreSection,
}

#[derive(Debug, Default, Deserialize)]
struct StoreSection {
    url: Option<String>,
    anon_key: Option<String>,
    access_token: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_url(key: &str, value: Option<String>) -> Result<Option<Url>, ConfigError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(Some(url))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_complete_env() {
        let config = StoreConfig::from_lookup(env(&[
            (ENV_URL, "https://abc.example.co"),
            (ENV_ANON_KEY, "anon"),
        ]))
        .unwrap();

        let (url, key) = config.credentials().unwrap();
        assert_eq!(url.as_str(), "https://abc.example.co/");
        assert_eq!(key, "anon");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_missing_or_blank_values_are_incomplete() {
        let config = StoreConfig::from_lookup(env(&[(ENV_URL, "https://abc.example.co")])).unwrap();
        assert!(!config.is_complete());

        let config = StoreConfig::from_lookup(env(&[
            (ENV_URL, "  "),
            (ENV_ANON_KEY, "anon"),
        ]))
        .unwrap();
        assert!(config.url.is_none());
        assert!(!config.is_complete());
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        let err = StoreConfig::from_lookup(env(&[(ENV_URL, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = StoreConfig::from_lookup(env(&[(ENV_URL, "ftp://abc.example.co")])).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_toml_file_format() {
        let config = StoreConfig::from_toml_str(
            r#"
            [store]
            url = "https://file.example.co"
            anon_key = "from-file"
            "#,
        )
        .unwrap();
        assert!(config.is_complete());
        assert!(StoreConfig::from_toml_str("").unwrap() == StoreConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[store]\nurl = \"https://file.example.co\"\nanon_key = \"from-file\"\n",
        )
        .unwrap();

        let config = StoreConfig::load_with(env(&[(ENV_ANON_KEY, "from-env")]), Some(path)).unwrap();

        assert_eq!(config.url.unwrap().as_str(), "https://file.example.co/");
        assert_eq!(config.anon_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::load_with(env(&[]), Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = StoreConfig::new(Url::parse("https://abc.example.co").unwrap(), "secret")
            .with_access_token("token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("token\""));
        assert!(rendered.contains("<redacted>"));
    }
}
