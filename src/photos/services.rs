use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::models::Photo;
use crate::common::{generate_photo_id, generate_raw_id, ApiError};

/// Insert attempts before giving up on finding a free storage path
const MAX_INSERT_ATTEMPTS: usize = 3;
const PATH_SALT_LENGTH: usize = 8;

/// Lowercase hex SHA-256 of the file contents, the deduplication key
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Storage key derived from name and upload time, optionally salted.
///
/// Not content-addressed: it only has to be unguessable and distinct per
/// stored file.
pub fn storage_path(name: &str, uploaded_at: i64, salt: Option<&str>) -> String {
    let seed = match salt {
        Some(salt) => format!("{}-{}-{}", name, uploaded_at, salt),
        None => format!("{}-{}", name, uploaded_at),
    };
    hex::encode(Sha256::digest(seed.as_bytes()))
}

enum InsertOutcome {
    Created(Photo),
    /// Unique constraint hit on hash, path or id
    Conflict,
}

pub struct PhotosService {
    db: SqlitePool,
    photos_dir: PathBuf,
}

impl PhotosService {
    pub fn new(db: SqlitePool, photos_dir: PathBuf) -> Self {
        Self { db, photos_dir }
    }

    pub async fn find_by_hash(&self, hash: &str) -> Result<Option<Photo>, ApiError> {
        sqlx::query_as::<_, Photo>(
            "SELECT id, name, size, uploaded_at, hash, path FROM photos WHERE hash = ?",
        )
        .bind(hash)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Photo>, ApiError> {
        sqlx::query_as::<_, Photo>(
            "SELECT id, name, size, uploaded_at, hash, path FROM photos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    /// All photos, newest first
    pub async fn list(&self) -> Result<Vec<Photo>, ApiError> {
        sqlx::query_as::<_, Photo>(
            "SELECT id, name, size, uploaded_at, hash, path FROM photos ORDER BY uploaded_at DESC, id ASC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    /// Store an uploaded file, or return the existing record for identical bytes
    pub async fn store(&self, name: &str, data: &[u8]) -> Result<Photo, ApiError> {
        self.store_at(name, data, chrono::Utc::now().timestamp_millis())
            .await
    }

    /// [`store`](Self::store) with an explicit upload time
    pub async fn store_at(
        &self,
        name: &str,
        data: &[u8],
        uploaded_at: i64,
    ) -> Result<Photo, ApiError> {
        let hash = content_hash(data);

        if let Some(existing) = self.find_by_hash(&hash).await? {
            debug!(photo_id = %existing.id, hash = %hash, "Photo already stored, returning existing record");
            return Ok(existing);
        }

        let mut path = storage_path(name, uploaded_at, None);
        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            match self.try_insert(name, data, &hash, &path, uploaded_at).await? {
                InsertOutcome::Created(photo) => {
                    info!(photo_id = %photo.id, size = photo.size, hash = %photo.hash, "Photo stored");
                    return Ok(photo);
                }
                InsertOutcome::Conflict => {
                    // Another upload of the same bytes may have won the race
                    if let Some(existing) = self.find_by_hash(&hash).await? {
                        info!(photo_id = %existing.id, hash = %hash, "Concurrent upload stored the same content first");
                        return Ok(existing);
                    }
                    warn!(attempt, path = %path, "Storage path already taken, salting");
                    path = storage_path(name, uploaded_at, Some(&generate_raw_id(PATH_SALT_LENGTH)));
                }
            }
        }

        error!(hash = %hash, "Could not allocate a storage path for photo");
        Err(ApiError::InternalServer(
            "Could not allocate a storage path".to_string(),
        ))
    }

    /// Insert the row and write the bytes in one transaction.
    ///
    /// The row only commits once the file is on disk; a dropped transaction
    /// rolls back.
    async fn try_insert(
        &self,
        name: &str,
        data: &[u8],
        hash: &str,
        path: &str,
        uploaded_at: i64,
    ) -> Result<InsertOutcome, ApiError> {
        let photo = Photo {
            id: generate_photo_id(),
            name: name.to_string(),
            size: data.len() as i64,
            uploaded_at,
            hash: hash.to_string(),
            path: path.to_string(),
        };

        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        // Writing first takes the write lock immediately, so concurrent
        // uploads queue on the busy timeout instead of failing a lock upgrade
        let inserted = sqlx::query(
            r#"
            INSERT INTO photos (id, name, size, uploaded_at, hash, path)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(hash) DO NOTHING
            "#,
        )
        .bind(&photo.id)
        .bind(&photo.name)
        .bind(photo.size)
        .bind(photo.uploaded_at)
        .bind(&photo.hash)
        .bind(&photo.path)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(result) if result.rows_affected() == 0 => {
                tx.rollback().await.map_err(ApiError::DatabaseError)?;
                return Ok(InsertOutcome::Conflict);
            }
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tx.rollback().await.map_err(ApiError::DatabaseError)?;
                return Ok(InsertOutcome::Conflict);
            }
            Err(e) => return Err(ApiError::DatabaseError(e)),
        }

        let file_path = self.photos_dir.join(path);
        tokio::fs::write(&file_path, data).await.map_err(|e| {
            error!(error = %e, file_path = %file_path.display(), "Failed to write photo file");
            ApiError::InternalServer("Failed to save photo file".to_string())
        })?;

        if let Err(e) = tx.commit().await {
            remove_quietly(&file_path).await;
            return Err(ApiError::DatabaseError(e));
        }

        Ok(InsertOutcome::Created(photo))
    }

    /// Stored bytes of a photo
    pub async fn read_content(&self, photo: &Photo) -> Result<Vec<u8>, ApiError> {
        let file_path = self.photos_dir.join(&photo.path);
        tokio::fs::read(&file_path).await.map_err(|e| {
            error!(error = %e, photo_id = %photo.id, "Failed to read photo file");
            ApiError::InternalServer("Failed to read photo file".to_string())
        })
    }
}

async fn remove_quietly(file_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(file_path).await {
        warn!(error = %e, file_path = %file_path.display(), "Failed to remove orphaned photo file");
    }
}
