//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PANTRY_API_URL` - Base URL of the remote storefront backend
//!
//! ## Optional
//! - `PANTRY_DATA_DIR` - Directory for local storage slots
//!   (default: `.spice-pantry`)
//! - `PANTRY_SHIPPING_FEE` - Flat shipping fee in rupees (default: 50)
//! - `PANTRY_OFFLINE_ORDERS` - `confirm` or `reject`: what to do when the
//!   order service is unreachable at submit time (default: confirm)
//! - `PANTRY_CONTACT_ENDPOINT` / `PANTRY_CONTACT_ACCESS_KEY` - Third-party
//!   contact-form sink; both must be set to enable it

use std::path::PathBuf;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::checkout::{CheckoutPolicy, OfflineOrderPolicy};

/// Default directory for local storage slots.
const DEFAULT_DATA_DIR: &str = ".spice-pantry";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the remote storefront backend. Always ends with `/` so
    /// endpoint paths join cleanly.
    pub api_base_url: Url,
    /// Directory holding the local storage slots (cart, user, token).
    pub data_dir: PathBuf,
    /// Checkout knobs: shipping fee and offline-order policy.
    pub checkout: CheckoutPolicy,
    /// Contact-form sink, when configured.
    pub contact: Option<ContactConfig>,
}

/// Third-party contact-form sink configuration.
///
/// Implements `Debug` manually to redact the access key.
#[derive(Clone)]
pub struct ContactConfig {
    /// Endpoint the contact form POSTs to.
    pub endpoint: Url,
    /// Access key identifying this site to the sink.
    pub access_key: SecretString,
}

impl std::fmt::Debug for ContactConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url("PANTRY_API_URL", &get_required_env("PANTRY_API_URL")?)?;
        let data_dir = PathBuf::from(get_env_or_default("PANTRY_DATA_DIR", DEFAULT_DATA_DIR));

        let shipping_fee = get_env_or_default("PANTRY_SHIPPING_FEE", "50")
            .parse::<Decimal>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PANTRY_SHIPPING_FEE".to_string(), e.to_string())
            })?;
        let offline = get_env_or_default("PANTRY_OFFLINE_ORDERS", "confirm")
            .parse::<OfflineOrderPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("PANTRY_OFFLINE_ORDERS".to_string(), e))?;
        let checkout = CheckoutPolicy {
            offline,
            shipping_fee,
            ..CheckoutPolicy::default()
        };

        let contact = contact_from_env()?;

        Ok(Self {
            api_base_url,
            data_dir,
            checkout,
            contact,
        })
    }

    /// Build a configuration pointing at `base_url` with defaults for
    /// everything else. Used by tests and by front ends that manage their
    /// own settings.
    #[must_use]
    pub fn for_base_url(api_base_url: Url) -> Self {
        Self {
            api_base_url: ensure_trailing_slash(api_base_url),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            checkout: CheckoutPolicy::default(),
            contact: None,
        }
    }
}

fn contact_from_env() -> Result<Option<ContactConfig>, ConfigError> {
    let endpoint = get_optional_env("PANTRY_CONTACT_ENDPOINT");
    let access_key = get_optional_env("PANTRY_CONTACT_ACCESS_KEY");

    match (endpoint, access_key) {
        (Some(endpoint), Some(access_key)) => {
            let endpoint = Url::parse(&endpoint).map_err(|e| {
                ConfigError::InvalidEnvVar("PANTRY_CONTACT_ENDPOINT".to_string(), e.to_string())
            })?;
            Ok(Some(ContactConfig {
                endpoint,
                access_key: SecretString::from(access_key),
            }))
        }
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar(
            "PANTRY_CONTACT_ACCESS_KEY".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar(
            "PANTRY_CONTACT_ENDPOINT".to_string(),
        )),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a base URL and normalize it to end with `/` so relative endpoint
/// paths join underneath it instead of replacing the last segment.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(ensure_trailing_slash(url))
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("TEST", "https://api.spicepantry.in").unwrap();
        assert_eq!(url.as_str(), "https://api.spicepantry.in/");

        let url = parse_base_url("TEST", "https://api.spicepantry.in/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.spicepantry.in/v1/");

        // Already normalized URLs are untouched.
        let url = parse_base_url("TEST", "https://api.spicepantry.in/v1/").unwrap();
        assert_eq!(url.as_str(), "https://api.spicepantry.in/v1/");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("TEST", "not a url").is_err());
    }

    #[test]
    fn test_base_url_joins_relative_paths() {
        let url = parse_base_url("TEST", "https://api.spicepantry.in/v1").unwrap();
        let joined = url.join("orders/guest").unwrap();
        assert_eq!(joined.as_str(), "https://api.spicepantry.in/v1/orders/guest");
    }

    #[test]
    fn test_for_base_url_defaults() {
        let config =
            StorefrontConfig::for_base_url("http://localhost:5050".parse().unwrap());
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5050/");
        assert_eq!(
            config.checkout.offline,
            crate::checkout::OfflineOrderPolicy::Confirm
        );
        assert!(config.contact.is_none());
    }

    #[test]
    fn test_contact_config_debug_redacts_access_key() {
        let config = ContactConfig {
            endpoint: "https://sink.example.com/submit".parse().unwrap(),
            access_key: SecretString::from("super_secret_access_key"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("sink.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_access_key"));
    }
}
