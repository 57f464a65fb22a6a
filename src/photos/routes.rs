use axum::{extract::DefaultBodyLimit, routing::get, Router};

use super::handlers;

/// Largest accepted upload body
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Photo routes, mounted under the API base path
pub fn photos_routes() -> Router {
    Router::new()
        .route(
            "/photos",
            get(handlers::list_photos).post(handlers::upload_photo),
        )
        .route("/photos/:id/content", get(handlers::serve_photo_content))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
