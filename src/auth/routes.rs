//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// OAuth login routes, mounted at the root
///
/// # Routes
/// - `GET /authenticate/google` - Start Google OAuth
/// - `GET /authenticate/google/callback` - Google OAuth callback
pub fn auth_routes() -> Router {
    Router::new()
        .route("/authenticate/google", get(handlers::google_oauth_start))
        .route(
            "/authenticate/google/callback",
            get(handlers::google_oauth_callback),
        )
}

/// Session routes, mounted under the API base path
///
/// # Routes
/// - `GET /me` - Current user
/// - `POST /auth/logout` - Logout
pub fn session_routes() -> Router {
    Router::new()
        .route("/me", get(handlers::me_handler))
        .route("/auth/logout", post(handlers::logout_handler))
}
