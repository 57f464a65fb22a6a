use axum::{routing::get, Router};

use super::handlers;

/// Journal routes, mounted under the API base path
pub fn journal_routes() -> Router {
    Router::new().route(
        "/journal-entries",
        get(handlers::list_entries).post(handlers::create_entry),
    )
}
