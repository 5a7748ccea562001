//! Contact-form sink client.
//!
//! Fire-and-forget delivery of store-contact messages to an externally
//! configured form endpoint. Failures never touch cart or checkout state;
//! they are logged and reported to the caller, who may simply tell the
//! user to try again.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::ContactConfig;

/// Errors that can occur submitting a contact message.
#[derive(Debug, Error)]
pub enum ContactError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sink returned an error response.
    #[error("contact sink error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// A message entered into the contact form.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct SinkRequest<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct SinkResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the contact-form sink.
#[derive(Clone)]
pub struct ContactClient {
    client: reqwest::Client,
    endpoint: Url,
    access_key: String,
}

impl ContactClient {
    /// Create a new contact sink client.
    #[must_use]
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.expose_secret().to_owned(),
        }
    }

    /// Deliver one contact message.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Api`] when the sink refuses the message,
    /// [`ContactError::Http`] on transport failure.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn submit(&self, message: &ContactMessage) -> Result<(), ContactError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&SinkRequest {
                access_key: &self.access_key,
                name: &message.name,
                email: &message.email,
                message: &message.message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContactError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body: SinkResponse = response.json().await?;
        if body.success {
            Ok(())
        } else {
            Err(ContactError::Api {
                status: status.as_u16(),
                message: body.message.unwrap_or_else(|| "submission refused".to_string()),
            })
        }
    }
}
