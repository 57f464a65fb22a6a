//! Authentication handlers

use axum::{
    extract::{rejection::QueryRejection, Extension, Json, Query},
    http::{header, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::csrf::{self, CSRF_TOKEN_COOKIE_NAME};
use super::extractors::AuthedUser;
use super::models::{AuthResponse, CallbackParams, LoginParams};
use super::oauth;
use super::services::UsersService;
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

/// GET /authenticate/google
/// Redirects to Google's consent screen and sets the CSRF cookie
///
/// # Query
/// - `redirectUrl` (optional) - where Google should send the browser back;
///   defaults to the configured redirect URI
pub async fn google_oauth_start(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<LoginParams>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let login = oauth::begin_login(
        &state.google_service,
        &state.config.jwt_secret,
        params.redirect_url.as_deref(),
    )?;

    let jar = jar.add(csrf::csrf_cookie(login.sealed_state, state.config.cookie_secure));

    info!("Redirecting to Google OAuth");
    Ok((
        StatusCode::FOUND,
        jar,
        [(header::LOCATION, login.authorization_url)],
    ))
}

/// GET /authenticate/google/callback
/// Completes the login started by [`google_oauth_start`]
///
/// # Response
/// ```json
/// {
///   "user": { "id": "U_K7NP3X", "email": "...", "created_at": "..." },
///   "token": "<jwt token>"
/// }
/// ```
///
/// The CSRF cookie is cleared on every outcome, including errors.
pub async fn google_oauth_callback(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<CallbackParams>, QueryRejection>,
    jar: CookieJar,
) -> (CookieJar, Result<Json<AuthResponse>, ApiError>) {
    let sealed = jar
        .get(CSRF_TOKEN_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string());
    let jar = jar.add(csrf::removal_cookie(state.config.cookie_secure));

    let Query(params) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable OAuth callback query");
            return (jar, Err(ApiError::from(oauth::OAuthError::MalformedState)));
        }
    };

    let result = oauth::finish_login(&state, &params, sealed.as_deref())
        .await
        .map(|response| {
            debug!(token = %safe_token_log(&response.token), "Issued session token");
            Json(response)
        })
        .map_err(ApiError::from);

    (jar, result)
}

/// GET /api/me
/// Returns the user behind the bearer token
pub async fn me_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = UsersService::new(state.db.clone())
        .find_by_id(&authed.id)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(serde_json::json!({ "user": user })))
}

/// POST /api/auth/logout
/// Session tokens are stateless, so logout only acknowledges the request;
/// the client discards its token
pub async fn logout_handler(authed: AuthedUser) -> Json<serde_json::Value> {
    info!(
        user_id = %authed.id,
        email = %safe_email_log(&authed.email),
        "User logout"
    );
    Json(serde_json::json!({ "message": "Logout successful" }))
}
