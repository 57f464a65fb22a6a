//! Authorization-code login flow against Google.
//!
//! `begin_login` produces the consent URL and the sealed CSRF cookie value.
//! `finish_login` verifies the callback, exchanges the code, resolves the
//! email, upserts the user and mints a session token.

use thiserror::Error;
use tracing::{info, warn};

use super::csrf;
use super::models::{AuthResponse, CallbackParams};
use super::services::UsersService;
use crate::common::{safe_email_log, AppState};
use crate::services::google::{GoogleError, GoogleService};

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Malformed OAuth state")]
    MalformedState,

    #[error("Invalid CSRF token.")]
    CsrfMismatch,

    #[error("Authorization denied: {0}")]
    ProviderDenied(String),

    #[error("Google account email is not verified")]
    UnverifiedEmail,

    #[error("Error while fetching token from Google. Status: {status}, Response: {reason}")]
    TokenExchangeFailed { status: u16, reason: String },

    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("Identity provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Could not issue token: {0}")]
    TokenIssue(String),
}

impl From<GoogleError> for OAuthError {
    fn from(err: GoogleError) -> Self {
        match err {
            GoogleError::NotConfigured => OAuthError::NotConfigured,
            GoogleError::TokenExchangeFailed { status, reason } => {
                OAuthError::TokenExchangeFailed { status, reason }
            }
            GoogleError::UnverifiedEmail => OAuthError::UnverifiedEmail,
            GoogleError::RequestFailed(_) | GoogleError::InvalidResponse(_) => {
                OAuthError::Upstream(err.to_string())
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for OAuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        OAuthError::TokenIssue(err.to_string())
    }
}

/// Where to send the browser, and what to put in the CSRF cookie
#[derive(Debug)]
pub struct LoginRedirect {
    pub authorization_url: String,
    pub sealed_state: String,
}

pub fn begin_login(
    google: &GoogleService,
    secret: &str,
    desired_redirect: Option<&str>,
) -> Result<LoginRedirect, OAuthError> {
    let redirect = desired_redirect
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| google.default_redirect_uri());

    let nonce = csrf::generate_nonce();
    let sealed_state = csrf::seal(&nonce, redirect, secret)?;
    let authorization_url = google.authorization_url(redirect, &csrf::encode_state(&nonce, redirect))?;

    Ok(LoginRedirect {
        authorization_url,
        sealed_state,
    })
}

/// Complete a login from the callback parameters and the `CSRFTOKEN` cookie
/// value the browser sent back. Clearing the cookie is the caller's job.
pub async fn finish_login(
    state: &AppState,
    params: &CallbackParams,
    sealed_cookie: Option<&str>,
) -> Result<AuthResponse, OAuthError> {
    if let Some(reason) = &params.error {
        warn!(oauth_error = %reason, "Google OAuth returned error");
        return Err(OAuthError::ProviderDenied(reason.clone()));
    }

    let raw_state = params.state.as_deref().ok_or(OAuthError::MalformedState)?;
    let (state_csrf, redirect_target) =
        csrf::split_state(raw_state).ok_or(OAuthError::MalformedState)?;

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(OAuthError::MalformedState)?;

    let sealed = sealed_cookie
        .and_then(|value| csrf::open(value, &state.config.jwt_secret))
        .ok_or_else(|| {
            warn!("CSRF cookie missing, expired or tampered");
            OAuthError::CsrfMismatch
        })?;

    if sealed.nonce != state_csrf || sealed.redirect != redirect_target {
        warn!("CSRF token in state does not match cookie");
        return Err(OAuthError::CsrfMismatch);
    }

    let google = &state.google_service;
    let token = google.exchange_code(code, redirect_target).await?;
    let email = google.fetch_email(&token.access_token).await?;

    let user = UsersService::new(state.db.clone())
        .find_or_create_by_email(&email)
        .await?;

    let token = state.token_service.generate_token(&user)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    Ok(AuthResponse { user, token })
}
