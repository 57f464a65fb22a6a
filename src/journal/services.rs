use sqlx::SqlitePool;
use tracing::info;

use super::models::{CreateJournalEntryRequest, JournalEntry};
use crate::common::{generate_journal_entry_id, ApiError};

const MAX_TITLE_LENGTH: usize = 200;

pub struct JournalService {
    db: SqlitePool,
}

impl JournalService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All entries, newest first
    pub async fn list(&self) -> Result<Vec<JournalEntry>, ApiError> {
        sqlx::query_as::<_, JournalEntry>(
            "SELECT id, title, body, created_at FROM journal_entries ORDER BY created_at DESC, id ASC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    pub async fn create(&self, request: CreateJournalEntryRequest) -> Result<JournalEntry, ApiError> {
        if request.body.trim().is_empty() {
            return Err(ApiError::ValidationError("body: must not be empty".to_string()));
        }

        let title = request
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if title.as_ref().map_or(false, |t| t.chars().count() > MAX_TITLE_LENGTH) {
            return Err(ApiError::ValidationError(format!(
                "title: must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        let entry = JournalEntry {
            id: generate_journal_entry_id(),
            title,
            body: request.body,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        sqlx::query("INSERT INTO journal_entries (id, title, body, created_at) VALUES (?, ?, ?, ?)")
            .bind(&entry.id)
            .bind(entry.title.as_deref())
            .bind(&entry.body)
            .bind(entry.created_at)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(entry_id = %entry.id, "Journal entry created");
        Ok(entry)
    }
}
