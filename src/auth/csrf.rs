//! CSRF binding between login initiation and the OAuth callback.
//!
//! The nonce travels twice: inside the `state` parameter that Google echoes
//! back, and inside the `CSRFTOKEN` cookie. The cookie does not hold the bare
//! nonce but a short-lived HS256 token sealing the nonce together with the
//! redirect target, so the callback can be verified without server-side state.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::common::generate_raw_id;

pub const CSRF_TOKEN_COOKIE_NAME: &str = "CSRFTOKEN";
pub const CSRF_COOKIE_PATH: &str = "/authenticate";
pub const CSRF_TTL_SECONDS: i64 = 60;

/// 26 Crockford characters, 130 bits
const NONCE_LENGTH: usize = 26;
const STATE_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrfClaims {
    pub nonce: String,
    pub redirect: String,
    pub exp: usize,
}

pub fn generate_nonce() -> String {
    generate_raw_id(NONCE_LENGTH)
}

/// The OAuth `state` value: `nonce|redirect`
pub fn encode_state(nonce: &str, redirect: &str) -> String {
    format!("{}{}{}", nonce, STATE_SEPARATOR, redirect)
}

/// Split a returned `state` on its first separator into `(nonce, redirect)`.
/// Nonces never contain the separator, so the redirect part may.
pub fn split_state(state: &str) -> Option<(&str, &str)> {
    state.split_once(STATE_SEPARATOR)
}

/// Seal nonce and redirect into the cookie value, valid for 60 seconds
pub fn seal(nonce: &str, redirect: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = Utc::now().timestamp() + CSRF_TTL_SECONDS;
    seal_until(nonce, redirect, secret, exp)
}

fn seal_until(
    nonce: &str,
    redirect: &str,
    secret: &str,
    exp: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = CsrfClaims {
        nonce: nonce.to_string(),
        redirect: redirect.to_string(),
        exp: exp.max(0) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a cookie value. Tampered, foreign and expired values yield `None`.
pub fn open(sealed: &str, secret: &str) -> Option<CsrfClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<CsrfClaims>(sealed, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .ok()
}

pub fn csrf_cookie(sealed: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_TOKEN_COOKIE_NAME, sealed))
        .path(CSRF_COOKIE_PATH)
        .max_age(time::Duration::seconds(CSRF_TTL_SECONDS))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that clears `CSRFTOKEN` in the browser (max-age 0)
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_TOKEN_COOKIE_NAME, ""))
        .path(CSRF_COOKIE_PATH)
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}
