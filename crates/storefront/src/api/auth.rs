//! Auth service client: login, signup, current user.
//!
//! Token issuance is the service's job; this client only exchanges
//! credentials for a bearer token and profile, and validates a cached
//! token via the current-user endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::config::StorefrontConfig;
use crate::models::user::UserProfile;

use super::{ApiError, check_response};

/// Response to a successful login or signup: a bearer token plus the user
/// profile fields at the top level.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Client for the auth service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    /// Create a new auth service client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
        }
    }

    /// Exchange email and password for a token and profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, and
    /// transport/server errors otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("login")?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let response = check_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Register a new account and log it in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the service refuses the details
    /// (e.g. email already registered), and transport/server errors
    /// otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("signup")?;
        let response = self
            .client
            .post(url)
            .json(&SignupRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;
        let response = check_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the profile for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is stale or
    /// revoked; callers should drop their cached session in that case.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &SecretString) -> Result<UserProfile, ApiError> {
        let url = self.endpoint("me")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        let response = check_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::Server {
            status: 0,
            message: format!("invalid endpoint {path}: {e}"),
        })
    }
}
