//! Unified error handling.
//!
//! Front ends work against a single `StorefrontError` and use
//! [`StorefrontError::user_message`] to render something the customer can
//! act on. Internal detail (transport failures, storage paths) stays in
//! the `Display`/`source` chain for logs and never reaches the user.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::services::contact::ContactError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// A remote service call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A checkout attempt failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Local slot storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The contact sink refused or could not be reached.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// The user asked for something that needs a login.
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Anything else worth stopping for.
    #[error("{0}")]
    Other(String),
}

impl StorefrontError {
    /// A message suitable for showing to the customer.
    ///
    /// Server-authored rejection messages pass through verbatim; internal
    /// errors are collapsed to a generic line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => match err {
                ApiError::Unauthorized(_) => {
                    "Please log in again and retry.".to_string()
                }
                // 400-class messages are written by the service for users.
                ApiError::Rejected(message) => message.clone(),
                ApiError::NotFound(message) => format!("Not found: {message}"),
                ApiError::Http(_) | ApiError::Server { .. } | ApiError::Parse(_) => {
                    "The store service is currently unavailable. Please try again later."
                        .to_string()
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::Rejected(message) => message.clone(),
                CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
                CheckoutError::SubmissionInFlight => {
                    "Your order is already being placed.".to_string()
                }
                CheckoutError::NotAtReview => {
                    "Please review your order before placing it.".to_string()
                }
                CheckoutError::Api(_) | CheckoutError::Storage(_) => {
                    "There was an error processing your order. Please try again.".to_string()
                }
            },
            Self::Storage(_) => "Could not read or write local data.".to_string(),
            Self::Config(err) => err.to_string(),
            Self::Contact(_) => {
                "Your message could not be sent right now. Please try again later.".to_string()
            }
            Self::AuthRequired(message) | Self::Other(message) => message.clone(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages_pass_through() {
        let err = StorefrontError::Api(ApiError::Rejected(
            "Invalid shipping address".to_string(),
        ));
        assert_eq!(err.user_message(), "Invalid shipping address");

        let err = StorefrontError::Checkout(CheckoutError::Rejected(
            "Order total mismatch".to_string(),
        ));
        assert_eq!(err.user_message(), "Order total mismatch");
    }

    #[test]
    fn test_internal_errors_are_collapsed() {
        let err = StorefrontError::Api(ApiError::Server {
            status: 503,
            message: "pod evicted on node 7".to_string(),
        });
        let message = err.user_message();
        assert!(!message.contains("pod"));
        assert!(message.contains("unavailable"));
    }

    #[test]
    fn test_empty_cart_message() {
        let err = StorefrontError::Checkout(CheckoutError::EmptyCart);
        assert_eq!(err.user_message(), "Your cart is empty.");
    }
}
