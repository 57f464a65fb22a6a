use axum::extract::{rejection::JsonRejection, Extension, Json};
use std::sync::Arc;

use super::models::{CreateJournalEntryRequest, JournalEntry};
use super::services::JournalService;
use crate::common::{ApiError, AppState};

/// GET /api/journal-entries
pub async fn list_entries(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let entries = JournalService::new(state.db.clone()).list().await?;
    Ok(Json(entries))
}

/// POST /api/journal-entries
pub async fn create_entry(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<CreateJournalEntryRequest>, JsonRejection>,
) -> Result<Json<JournalEntry>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::ValidationError(rejection.body_text()))?;

    let entry = JournalService::new(state.db.clone()).create(request).await?;
    Ok(Json(entry))
}
