//! Tests for the photos module

#[cfg(test)]
mod tests {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::common::migrations::{create_tables, setup_test_db};
    use crate::common::ApiError;
    use crate::photos::services::{content_hash, storage_path, PhotosService};

    async fn photo_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM photos")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    /// On-disk database so several connections can race each other
    async fn shared_pool(dir: &TempDir) -> SqlitePool {
        let url = format!("sqlite://{}", dir.path().join("photos.db").display());
        let options = SqliteConnectOptions::from_str(&url)
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();
        pool
    }

    #[test]
    fn test_content_hash_is_hex_sha256() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_storage_path_depends_on_name_time_and_salt() {
        let base = storage_path("cat.jpg", 1_700_000_000_000, None);
        assert_eq!(base.len(), 64);
        assert_eq!(base, storage_path("cat.jpg", 1_700_000_000_000, None));
        assert_ne!(base, storage_path("dog.jpg", 1_700_000_000_000, None));
        assert_ne!(base, storage_path("cat.jpg", 1_700_000_000_001, None));
        assert_ne!(base, storage_path("cat.jpg", 1_700_000_000_000, Some("SALT1234")));
    }

    #[tokio::test]
    async fn test_store_writes_file_and_row() {
        let dir = TempDir::new().unwrap();
        let pool = setup_test_db().await;
        let service = PhotosService::new(pool.clone(), dir.path().to_path_buf());

        let photo = service.store_at("cat.jpg", b"meow", 42).await.unwrap();

        assert!(photo.id.starts_with("P_"));
        assert_eq!(photo.name, "cat.jpg");
        assert_eq!(photo.size, 4);
        assert_eq!(photo.uploaded_at, 42);
        assert_eq!(photo.hash, content_hash(b"meow"));
        assert_eq!(photo.path, storage_path("cat.jpg", 42, None));

        let on_disk = std::fs::read(dir.path().join(&photo.path)).unwrap();
        assert_eq!(on_disk, b"meow");
        assert_eq!(service.read_content(&photo).await.unwrap(), b"meow");
        assert_eq!(service.find_by_id(&photo.id).await.unwrap(), Some(photo));
        assert_eq!(photo_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_same_bytes_under_new_name_returns_existing() {
        let dir = TempDir::new().unwrap();
        let pool = setup_test_db().await;
        let service = PhotosService::new(pool.clone(), dir.path().to_path_buf());

        let first = service.store_at("a.png", b"same bytes", 1).await.unwrap();
        let second = service.store_at("b.png", b"same bytes", 2).await.unwrap();

        assert_eq!(second, first);
        assert_eq!(second.name, "a.png");
        assert_eq!(photo_count(&pool).await, 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_bytes_with_same_name_and_time_get_distinct_paths() {
        let dir = TempDir::new().unwrap();
        let pool = setup_test_db().await;
        let service = PhotosService::new(pool.clone(), dir.path().to_path_buf());

        let first = service.store_at("x.jpg", b"one", 7).await.unwrap();
        let second = service.store_at("x.jpg", b"two", 7).await.unwrap();

        assert_ne!(first.hash, second.hash);
        assert_eq!(first.path, storage_path("x.jpg", 7, None));
        assert_ne!(second.path, first.path);
        assert_eq!(photo_count(&pool).await, 2);

        assert_eq!(service.read_content(&first).await.unwrap(), b"one");
        assert_eq!(service.read_content(&second).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = TempDir::new().unwrap();
        let pool = setup_test_db().await;
        let service = PhotosService::new(pool, dir.path().to_path_buf());

        let old = service.store_at("old.jpg", b"old", 100).await.unwrap();
        let new = service.store_at("new.jpg", b"new", 200).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed, vec![new, old]);
    }

    #[tokio::test]
    async fn test_failed_file_write_leaves_no_row() {
        let dir = TempDir::new().unwrap();
        let pool = setup_test_db().await;
        let missing_dir = dir.path().join("does-not-exist");
        let broken = PhotosService::new(pool.clone(), missing_dir);

        let err = broken.store_at("cat.jpg", b"meow", 42).await.unwrap_err();
        assert!(matches!(err, ApiError::InternalServer(_)));
        assert_eq!(photo_count(&pool).await, 0);
        assert!(broken.find_by_hash(&content_hash(b"meow")).await.unwrap().is_none());

        // Same bytes go through once the directory is usable
        let service = PhotosService::new(pool.clone(), dir.path().to_path_buf());
        let photo = service.store_at("cat.jpg", b"meow", 42).await.unwrap();
        assert_eq!(photo.path, storage_path("cat.jpg", 42, None));
        assert_eq!(photo_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let dir = TempDir::new().unwrap();
        let service = PhotosService::new(setup_test_db().await, dir.path().to_path_buf());

        assert!(service.find_by_id("P_MISSING").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_identical_uploads_store_one_row() {
        let dir = TempDir::new().unwrap();
        let pool = shared_pool(&dir).await;
        let photos_dir = dir.path().join("photos");
        std::fs::create_dir_all(&photos_dir).unwrap();
        let service = Arc::new(PhotosService::new(pool.clone(), photos_dir.clone()));

        let uploads: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .store(&format!("copy-{}.jpg", i), b"identical payload")
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for upload in uploads {
            ids.push(upload.await.unwrap().unwrap().id);
        }

        ids.dedup();
        assert_eq!(ids.len(), 1, "every upload should resolve to the same record");
        assert_eq!(photo_count(&pool).await, 1);
        assert_eq!(std::fs::read_dir(&photos_dir).unwrap().count(), 1);
    }
}
