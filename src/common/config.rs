// src/common/config.rs
//! Environment-driven configuration

use std::env;
use std::path::PathBuf;

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/token";
pub const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Google OAuth client registration and endpoints
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleOAuthConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            client_secret: non_empty_var("GOOGLE_CLIENT_SECRET"),
            redirect_uri: env::var("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8080/".to_string()),
            auth_url: env::var("GOOGLE_AUTH_URL")
                .unwrap_or_else(|_| GOOGLE_AUTH_ENDPOINT.to_string()),
            token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| GOOGLE_TOKEN_ENDPOINT.to_string()),
            userinfo_url: env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| GOOGLE_USERINFO_ENDPOINT.to_string()),
        }
    }
}

/// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub api_base_path: String,
    pub photos_dir: PathBuf,
    pub jwt_secret: String,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub google: GoogleOAuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://photos.db".to_string()),
            port,
            api_base_path: normalize_base_path(
                &env::var("API_BASE_PATH").unwrap_or_else(|_| "/api".to_string()),
            ),
            photos_dir: PathBuf::from(
                env::var("PHOTOS_DIR").unwrap_or_else(|_| "./uploads/photos".to_string()),
            ),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "replace_with_strong_secret".to_string()),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_origins,
            google: GoogleOAuthConfig::from_env(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Base path always starts with `/` and never ends with one
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
