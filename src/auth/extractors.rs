//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::services::UsersService;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the bearer session token and checks the user still exists.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let header_value = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("Authentication failed: missing Authorization header");
                ApiError::Unauthorized("missing auth".into())
            })?;

        // "Bearer <token>" or the raw token
        let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

        let claims = app_state.token_service.validate(token).map_err(|e| {
            warn!(error = %e, "Session token validation failed");
            ApiError::Unauthorized("invalid token".into())
        })?;

        let user = UsersService::new(app_state.db.clone())
            .find_by_id(&claims.sub)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %claims.sub, "Database error during user lookup in authentication");
                ApiError::DatabaseError(e)
            })?;

        match user {
            Some(u) => {
                debug!(user_id = %u.id, email = %safe_email_log(&u.email), "User authenticated");
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                })
            }
            None => {
                warn!(user_id = %claims.sub, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}
