//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `REELCART_API_URL` - Base URL of the cart backend (e.g., `http://localhost:8080`)
//!
//! ## Optional
//! - `REELCART_API_TOKEN` - Bearer token sent with every request
//! - `REELCART_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MIN_TOKEN_BITS_PER_BYTE: f64 = 3.0;

/// Fragments of template tokens left in a copied `.env` (case-insensitive).
const TEMPLATE_TOKEN_FRAGMENTS: &[&str] = &["your-", "changeme", "placeholder", "xxxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Cart client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the cart backend
    pub api_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for a backend URL with defaults for everything else.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API token could not be sent as-is or looks like a template value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_api_url(None)
    }

    /// Load configuration from environment variables, with an explicit
    /// backend URL taking precedence over `REELCART_API_URL`.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_env_with_api_url(api_url: Option<&str>) -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| match (key, api_url) {
            ("REELCART_API_URL", Some(url)) => Some(url.to_string()),
            _ => std::env::var(key).ok(),
        })
    }

    /// Load configuration from an arbitrary key lookup.
    fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&get_required(&lookup, "REELCART_API_URL")?)?;

        let api_token = lookup("REELCART_API_TOKEN")
            .map(|value| check_api_token(&value).map(|()| value))
            .transpose()?
            .map(SecretString::from);

        let timeout_secs = lookup("REELCART_TIMEOUT_SECS")
            .map_or(Ok(DEFAULT_TIMEOUT_SECS), |raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("REELCART_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "REELCART_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Whether an API token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.api_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required value from the lookup.
fn get_required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse the backend URL, accepting only http and https.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unparseable URLs or other schemes.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("REELCART_API_URL".to_string(), e.to_string())
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            "REELCART_API_URL".to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Shannon entropy of a token in bits per byte.
fn bits_per_byte(token: &str) -> f64 {
    let mut bytes = token.as_bytes().to_vec();
    bytes.sort_unstable();

    #[allow(clippy::cast_precision_loss)]
    let len = bytes.len() as f64;
    bytes
        .chunk_by(|a, b| a == b)
        .map(|run| {
            #[allow(clippy::cast_precision_loss)]
            let p = run.len() as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Check a bearer token before it is attached to every request.
///
/// The token goes into an `Authorization` header verbatim, so it must be
/// non-empty visible ASCII. Values from an `.env` template and trivially
/// repetitive strings are refused.
fn check_api_token(token: &str) -> Result<(), ConfigError> {
    let insecure =
        |reason: String| ConfigError::InsecureSecret("REELCART_API_TOKEN".to_string(), reason);

    if token.is_empty() {
        return Err(insecure("is empty".to_string()));
    }
    if !token.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(insecure("must be visible ASCII without whitespace".to_string()));
    }

    let lower = token.to_ascii_lowercase();
    if let Some(fragment) = TEMPLATE_TOKEN_FRAGMENTS
        .iter()
        .copied()
        .find(|fragment| lower.contains(fragment))
    {
        return Err(insecure(format!(
            "looks like a template value (contains '{fragment}')"
        )));
    }

    let bits = bits_per_byte(token);
    if bits < MIN_TOKEN_BITS_PER_BYTE {
        return Err(insecure(format!(
            "too repetitive ({bits:.2} bits/byte, need >= {MIN_TOKEN_BITS_PER_BYTE:.1})"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_url() {
        let err = ClientConfig::from_source(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(k) if k == "REELCART_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config =
            ClientConfig::from_source(lookup_from(&[("REELCART_API_URL", "http://localhost:8080")]))
                .unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.has_token());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = ClientConfig::from_source(lookup_from(&[("REELCART_API_URL", "ftp://host")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_timeout_must_be_positive() {
        let err = ClientConfig::from_source(lookup_from(&[
            ("REELCART_API_URL", "http://localhost"),
            ("REELCART_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = ClientConfig::from_source(lookup_from(&[
            ("REELCART_API_URL", "http://localhost"),
            ("REELCART_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_template_token_rejected() {
        let err = ClientConfig::from_source(lookup_from(&[
            ("REELCART_API_URL", "http://localhost"),
            ("REELCART_API_TOKEN", "your-token-here"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));

        for token in ["CHANGEME-9f3k2L", "Qz7-placeholder-m2", "sk_live_XXXXXXXXXXXX"] {
            assert!(check_api_token(token).is_err(), "{token} accepted");
        }
    }

    #[test]
    fn test_token_words_that_are_not_template_markers_accepted() {
        // Real tokens may contain ordinary words.
        assert!(check_api_token("replace-Ex4mple-todo-9Kq").is_ok());
    }

    #[test]
    fn test_token_must_fit_in_a_header() {
        assert!(check_api_token("").is_err());
        assert!(check_api_token("aB3$xY9!mK2@ nL5#pQ7&").is_err());
        assert!(check_api_token("aB3$xY9!mK2@\nnL5#pQ7&").is_err());
    }

    #[test]
    fn test_repetitive_token_rejected() {
        let err = check_api_token("abababababababababab").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(var, _) if var == "REELCART_API_TOKEN"));
    }

    #[test]
    fn test_strong_token_accepted_and_redacted() {
        let config = ClientConfig::from_source(lookup_from(&[
            ("REELCART_API_URL", "https://cart.example.org"),
            ("REELCART_API_TOKEN", "aB3$xY9!mK2@nL5#pQ7&rT0*"),
        ]))
        .unwrap();
        assert!(config.has_token());
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("aB3$xY9"));
    }

    #[test]
    fn test_bits_per_byte() {
        assert!(bits_per_byte("aaaa").abs() < f64::EPSILON);
        assert!((bits_per_byte("abab") - 1.0).abs() < 0.01);
        assert!((bits_per_byte("abcdefgh") - 3.0).abs() < 0.01);
    }
}
