use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: String,
    /// Original filename as sent by the client, untrusted
    pub name: String,
    pub size: i64,
    /// Unix epoch milliseconds
    pub uploaded_at: i64,
    /// Hex SHA-256 of the file bytes
    pub hash: String,
    /// Storage key under the photos directory
    pub path: String,
}
