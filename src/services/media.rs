use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{MediaAsset, MediaUploadResponse, NewMediaAsset, PrivateFile};
use crate::services::AuditService;
use crate::storage::{BlobStore, Visibility};

/// MIME types accepted for public site media
pub const ALLOWED_PUBLIC_MEDIA_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Registry of stored blobs
pub struct MediaService;

impl MediaService {
    /// Register a durably written blob as an asset
    pub async fn register(db: &Database, asset: NewMediaAsset) -> Result<MediaAsset> {
        if asset.storage_path.is_empty() {
            return Err(AppError::Validation(
                "storage_path must not be empty".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO media_assets (id, kind, storage_path, mime_type, size_bytes, sha256_hash, is_public, created_at, created_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&asset.kind)
        .bind(&asset.storage_path)
        .bind(&asset.mime_type)
        .bind(asset.size_bytes)
        .bind(&asset.sha256_hash)
        .bind(asset.is_public)
        .bind(&now)
        .bind(&asset.created_by)
        .execute(db.pool())
        .await?;

        Self::resolve(db, &id).await
    }

    /// Look up an asset by id
    pub async fn resolve(db: &Database, asset_id: &str) -> Result<MediaAsset> {
        let asset: MediaAsset = sqlx::query_as("SELECT * FROM media_assets WHERE id = ?")
            .bind(asset_id)
            .fetch_optional(db.pool())
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        Ok(asset)
    }

    /// Admin upload of a public site asset (hero images, brochures, ...)
    pub async fn upload_public(
        db: &Database,
        blobs: &BlobStore,
        file_path: &Path,
        original_filename: &str,
        content_type: &str,
        kind: &str,
    ) -> Result<MediaUploadResponse> {
        if !ALLOWED_PUBLIC_MEDIA_TYPES.contains(&content_type) {
            return Err(AppError::Validation(
                "Unsupported file type for public media.".to_string(),
            ));
        }

        let file = tokio::fs::File::open(file_path).await?;
        let blob = blobs
            .store(file, Visibility::Public, kind, original_filename)
            .await?;

        let asset = Self::register(
            db,
            NewMediaAsset {
                kind: kind.to_string(),
                storage_path: blob.storage_path.clone(),
                mime_type: Some(content_type.to_string()),
                size_bytes: blob.size_bytes,
                sha256_hash: blob.sha256_hex,
                is_public: true,
                created_by: Some("admin".to_string()),
            },
        )
        .await?;

        Ok(MediaUploadResponse {
            id: asset.id,
            kind: asset.kind,
            url: Some(blob.public_url),
            storage_path: asset.storage_path,
        })
    }

    /// Resolve a private asset for download.
    ///
    /// Re-verifies the stored digest against the on-disk bytes before any
    /// data is released, then records the access.
    pub async fn fetch_private_verified(
        db: &Database,
        blobs: &BlobStore,
        asset_id: &str,
        requested_by: &str,
    ) -> Result<PrivateFile> {
        let asset = Self::resolve(db, asset_id).await?;

        if asset.is_public {
            return Err(AppError::AccessDenied(
                "This is a public asset; access it via its public URL.".to_string(),
            ));
        }

        let path = blobs.absolute_path(Visibility::Private, &asset.storage_path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AppError::NotFound("File missing on disk".to_string()));
        }

        let current_hash = blobs.hash_file(&path).await?;
        if current_hash != asset.sha256_hash {
            return Err(AppError::Integrity(
                "File hash mismatch. Stored file may be corrupted.".to_string(),
            ));
        }

        AuditService::record(db, &asset.id, requested_by).await?;

        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        Ok(PrivateFile {
            mime_type: asset
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            filename: format!("{}-{}{}", asset.kind, asset.id, suffix),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use tempfile::TempDir;

    async fn test_db(dir: &TempDir) -> Database {
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().unwrap()).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    fn test_blobs(dir: &TempDir) -> BlobStore {
        let config = MediaConfig {
            public_root: dir.path().join("pub").to_string_lossy().to_string(),
            private_root: dir.path().join("priv").to_string_lossy().to_string(),
            public_base_url: "/media".to_string(),
        };
        BlobStore::new(&config).unwrap()
    }

    async fn store_resume(db: &Database, blobs: &BlobStore, bytes: &[u8]) -> MediaAsset {
        let blob = blobs
            .store(bytes, Visibility::Private, "resumes", "cv.pdf")
            .await
            .unwrap();
        MediaService::register(
            db,
            NewMediaAsset {
                kind: "resume".to_string(),
                storage_path: blob.storage_path,
                mime_type: Some("application/pdf".to_string()),
                size_bytes: blob.size_bytes,
                sha256_hash: blob.sha256_hex,
                is_public: false,
                created_by: Some("careers_form:a@b.test".to_string()),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn private_fetch_round_trip_records_audit() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let blobs = test_blobs(&dir);

        let asset = store_resume(&db, &blobs, b"hello").await;
        assert_eq!(asset.size_bytes, 5);
        assert_eq!(
            asset.sha256_hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );

        let file = MediaService::fetch_private_verified(&db, &blobs, &asset.id, "admin_api:sekr...")
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&file.path).await.unwrap(), b"hello");
        assert_eq!(file.mime_type, "application/pdf");
        assert!(file.filename.starts_with("resume-"));
        assert!(file.filename.ends_with(".pdf"));

        let (count, by): (i64, String) = sqlx::query_as(
            "SELECT COUNT(*), MAX(downloaded_by) FROM download_audits WHERE asset_id = ?",
        )
        .bind(&asset.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(by, "admin_api:sekr...");
    }

    #[tokio::test]
    async fn corrupted_file_fails_integrity_check() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let blobs = test_blobs(&dir);

        let asset = store_resume(&db, &blobs, b"hello").await;

        // Tamper with the stored bytes
        let path = blobs.absolute_path(Visibility::Private, &asset.storage_path);
        tokio::fs::write(&path, b"tampered").await.unwrap();

        let err = MediaService::fetch_private_verified(&db, &blobs, &asset.id, "admin_api:sekr...")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Integrity(_)));

        // No audit row for a failed fetch
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM download_audits")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn public_asset_is_rejected_on_private_path() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let blobs = test_blobs(&dir);

        let blob = blobs
            .store(&b"banner"[..], Visibility::Public, "hero_image", "banner.png")
            .await
            .unwrap();
        let asset = MediaService::register(
            &db,
            NewMediaAsset {
                kind: "hero_image".to_string(),
                storage_path: blob.storage_path,
                mime_type: Some("image/png".to_string()),
                size_bytes: blob.size_bytes,
                sha256_hash: blob.sha256_hex,
                is_public: true,
                created_by: Some("admin".to_string()),
            },
        )
        .await
        .unwrap();

        let err = MediaService::fetch_private_verified(&db, &blobs, &asset.id, "admin_api:sekr...")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn missing_asset_and_missing_file_are_not_found() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let blobs = test_blobs(&dir);

        let err = MediaService::fetch_private_verified(&db, &blobs, "no-such-id", "admin_api:x...")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Registered but never written to disk
        let asset = MediaService::register(
            &db,
            NewMediaAsset {
                kind: "resume".to_string(),
                storage_path: "resumes/ghost.pdf".to_string(),
                mime_type: Some("application/pdf".to_string()),
                size_bytes: 3,
                sha256_hash: "abc".to_string(),
                is_public: false,
                created_by: None,
            },
        )
        .await
        .unwrap();

        let err = MediaService::fetch_private_verified(&db, &blobs, &asset.id, "admin_api:x...")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_storage_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let err = MediaService::register(
            &db,
            NewMediaAsset {
                kind: "resume".to_string(),
                storage_path: String::new(),
                mime_type: None,
                size_bytes: 0,
                sha256_hash: "abc".to_string(),
                is_public: false,
                created_by: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
