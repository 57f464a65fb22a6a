// src/services/google.rs
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::common::config::GoogleOAuthConfig;

/// OAuth scope requested from Google. Only the email is needed.
const SCOPES: &str = "email";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("Error while fetching token from Google. Status: {status}, Response: {reason}")]
    TokenExchangeFailed { status: u16, reason: String },

    #[error("Google account email is not verified")]
    UnverifiedEmail,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected response from Google: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    email_verified: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    config: GoogleOAuthConfig,
    client: Client,
}

impl GoogleService {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Redirect URI registered with Google, used when the caller does not ask
    /// for a specific one
    pub fn default_redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    fn credentials(&self) -> Result<(&str, &str), GoogleError> {
        match (&self.config.client_id, &self.config.client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(GoogleError::NotConfigured),
        }
    }

    /// Build the consent screen URL. `state` is passed through verbatim and
    /// comes back on the callback.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String, GoogleError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(GoogleError::NotConfigured)?;

        let separator = if self.config.auth_url.contains('?') { '&' } else { '?' };
        let auth_url = format!(
            "{}{}response_type=code&scope={}&client_id={}&redirect_uri={}&state={}",
            self.config.auth_url,
            separator,
            urlencoding::encode(SCOPES),
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        );

        debug!(redirect_uri = %redirect_uri, "Generated Google OAuth authorization URL");
        Ok(auth_url)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// `redirect_uri` must be the value used when the code was requested.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, GoogleError> {
        let (client_id, client_secret) = self.credentials()?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Token endpoint unreachable");
                GoogleError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Token exchange failed");
            return Err(GoogleError::TokenExchangeFailed {
                status: status.as_u16(),
                reason,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::InvalidResponse(e.to_string()))
    }

    /// Resolve an access token to the account's email address
    pub async fn fetch_email(&self, access_token: &str) -> Result<String, GoogleError> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Userinfo endpoint unreachable");
                GoogleError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GoogleError::InvalidResponse(format!(
                "userinfo returned {}",
                status
            )));
        }

        let info = response
            .json::<UserInfo>()
            .await
            .map_err(|e| GoogleError::InvalidResponse(e.to_string()))?;

        if info.email_verified == Some(false) {
            return Err(GoogleError::UnverifiedEmail);
        }

        info.email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| GoogleError::InvalidResponse("missing email".to_string()))
    }
}
