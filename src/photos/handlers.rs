use axum::{
    extract::{Extension, Json, Multipart, Path},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, info};

use super::models::Photo;
use super::services::PhotosService;
use crate::common::{ApiError, AppState};

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

fn photos_service(state: &AppState) -> PhotosService {
    PhotosService::new(state.db.clone(), state.config.photos_dir.clone())
}

/// POST /api/photos - Upload a photo (multipart field `file`)
///
/// Returns the stored record. Uploading bytes that were stored before returns
/// the earlier record unchanged.
pub async fn upload_photo(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Photo>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!(error = %e, "Failed to read multipart body");
        ApiError::InternalServer("Failed to read upload".to_string())
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read uploaded file data");
            ApiError::InternalServer("Failed to read file data".to_string())
        })?;

        info!(filename = %filename, size = data.len(), "Photo upload received");

        let photo = photos_service(&state).store(&filename, &data).await?;
        return Ok(Json(photo));
    }

    Err(ApiError::BadRequest("No file found in upload".to_string()))
}

/// GET /api/photos - List photo metadata, newest first
pub async fn list_photos(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Photo>>, ApiError> {
    let photos = photos_service(&state).list().await?;
    Ok(Json(photos))
}

/// GET /api/photos/:id/content - Serve the stored bytes
pub async fn serve_photo_content(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let service = photos_service(&state);
    let photo = service
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    let content = service.read_content(&photo).await?;
    let content_type = infer::get(&content)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            // Content never changes for a given id
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        content,
    ))
}
