//! REST clients for the remote storefront services.
//!
//! # Architecture
//!
//! - The remote services are the source of truth for products and placed
//!   orders - no local sync, direct API calls
//! - One client per service: [`OrderClient`], [`ProductClient`],
//!   [`AuthClient`]
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL); order
//!   and auth calls are never cached
//! - Authenticated calls carry a bearer token; unauthenticated order
//!   creation goes to a distinct guest endpoint
//!
//! # Example
//!
//! ```rust,ignore
//! use spice_pantry_storefront::api::{OrderClient, ProductClient};
//!
//! let products = ProductClient::new(&config);
//! let page = products.list(&ProductQuery::default()).await?;
//!
//! let orders = OrderClient::new(&config);
//! let created = orders.create(&draft, session.token()).await?;
//! ```

mod auth;
mod orders;
mod products;

pub use auth::{AuthClient, AuthResponse};
pub use orders::{
    CustomerInfo, Order, OrderClient, OrderCreated, OrderDraft, OrderItem, ShippingAddress,
};
pub use products::{Pagination, Product, ProductClient, ProductPage, ProductQuery};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the remote storefront services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the bearer token (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The service rejected the request as invalid (HTTP 400). The message
    /// is the server's own and is safe to show to the user.
    #[error("{0}")]
    Rejected(String),

    /// Resource not found (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response from the service.
    #[error("service error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not parse as the expected shape.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error body shape shared by the services: `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Map a non-success response to the [`ApiError`] taxonomy, extracting the
/// server's `message` field when present.
///
/// Successful responses pass through untouched.
pub(crate) async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| truncate(&body, 200));

    match status {
        reqwest::StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized(message)),
        reqwest::StatusCode::BAD_REQUEST => Err(ApiError::Rejected(message)),
        reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
        _ => Err(ApiError::Server {
            status: status.as_u16(),
            message,
        }),
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Rejected("Invalid shipping address".to_string());
        assert_eq!(err.to_string(), "Invalid shipping address");

        let err = ApiError::NotFound("order ORD-1".to_string());
        assert_eq!(err.to_string(), "not found: order ORD-1");

        let err = ApiError::Server {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "service error (HTTP 503): maintenance");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 200), "hello");
        assert_eq!(truncate("hello", 3), "hel");
    }
}
