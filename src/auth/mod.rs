//! # Auth Module
//!
//! Google OAuth login for the photos service:
//! - `GET /authenticate/google` starts the flow and sets the CSRF cookie
//! - `GET /authenticate/google/callback` finishes it, upserting the user by
//!   email and returning a session token
//! - `AuthedUser` extractor resolving bearer session tokens

pub mod csrf;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod services;


pub use routes::{auth_routes, session_routes};
