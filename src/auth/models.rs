//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session token claims
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: Option<String>,
}

/// Query string of `GET /authenticate/google`
#[derive(Deserialize, Debug, Default)]
pub struct LoginParams {
    #[serde(rename = "redirectUrl")]
    pub redirect_url: Option<String>,
}

/// Query string Google appends to the callback
#[derive(Deserialize, Debug, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Body returned after a successful login
#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
