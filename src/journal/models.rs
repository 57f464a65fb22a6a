use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: String,
    pub title: Option<String>,
    pub body: String,
    /// Unix epoch milliseconds
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateJournalEntryRequest {
    pub title: Option<String>,
    pub body: String,
}
