// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::services::{GoogleService, TokenService};

/// Database pool, services and configuration handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
    pub google_service: Arc<GoogleService>,
    pub token_service: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let google_service = Arc::new(GoogleService::new(config.google.clone()));
        let token_service = Arc::new(TokenService::new(&config.jwt_secret));

        Self {
            db,
            config,
            google_service,
            token_service,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State wired to an in-memory database and the given provider endpoints
    pub(crate) fn for_tests(
        db: SqlitePool,
        google: crate::common::config::GoogleOAuthConfig,
        photos_dir: std::path::PathBuf,
    ) -> Self {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            api_base_path: "/api".to_string(),
            photos_dir,
            jwt_secret: "test-jwt-secret".to_string(),
            cookie_secure: false,
            cors_origins: Vec::new(),
            google,
        };
        Self::new(db, config)
    }
}
