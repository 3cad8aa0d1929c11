use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{ApplicationForm, CareerApplication, NewMediaAsset};
use crate::services::MediaService;
use crate::storage::{BlobStore, Visibility};

/// MIME types accepted for resumes
pub const ALLOWED_RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Career application intake and admin listing
pub struct ApplicationService;

impl ApplicationService {
    /// Accept an application together with its resume file.
    ///
    /// The MIME check runs before anything touches disk or the database, so
    /// a rejected upload leaves no asset or application row behind.
    pub async fn submit(
        db: &Database,
        blobs: &BlobStore,
        form: ApplicationForm,
        resume_path: &Path,
        resume_filename: &str,
        resume_content_type: &str,
    ) -> Result<CareerApplication> {
        if !ALLOWED_RESUME_TYPES.contains(&resume_content_type) {
            return Err(AppError::Validation(
                "Unsupported file type. Allowed: PDF, DOC, DOCX.".to_string(),
            ));
        }

        let file = tokio::fs::File::open(resume_path).await?;
        let blob = blobs
            .store(file, Visibility::Private, "resumes", resume_filename)
            .await?;

        let asset = MediaService::register(
            db,
            NewMediaAsset {
                kind: "resume".to_string(),
                storage_path: blob.storage_path,
                mime_type: Some(resume_content_type.to_string()),
                size_bytes: blob.size_bytes,
                sha256_hash: blob.sha256_hex,
                is_public: false,
                created_by: Some(format!("careers_form:{}", form.email)),
            },
        )
        .await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO career_applications (id, full_name, email, phone, position, message, resume_asset_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&form.full_name)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.position)
        .bind(&form.message)
        .bind(&asset.id)
        .bind(&now)
        .execute(db.pool())
        .await?;

        tracing::info!(
            full_name = %form.full_name,
            position = %form.position,
            resume_asset_id = %asset.id,
            size_bytes = asset.size_bytes,
            "New career application"
        );

        let application: CareerApplication =
            sqlx::query_as("SELECT * FROM career_applications WHERE id = ?")
                .bind(&id)
                .fetch_one(db.pool())
                .await?;

        Ok(application)
    }

    /// List applications newest first, optionally filtered by a
    /// case-insensitive substring of the position
    pub async fn list(db: &Database, role: Option<&str>) -> Result<Vec<CareerApplication>> {
        let applications: Vec<CareerApplication> = match role {
            Some(r) if !r.trim().is_empty() => {
                sqlx::query_as(
                    "SELECT * FROM career_applications WHERE LOWER(position) LIKE '%' || LOWER(?) || '%' ORDER BY created_at DESC",
                )
                .bind(r.trim())
                .fetch_all(db.pool())
                .await?
            }
            _ => {
                sqlx::query_as("SELECT * FROM career_applications ORDER BY created_at DESC")
                    .fetch_all(db.pool())
                    .await?
            }
        };

        Ok(applications)
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

    fn form(name: &str, email: &str, position: &str) -> ApplicationForm {
        ApplicationForm {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: None,
            position: position.to_string(),
            message: None,
        }
    }

    async fn write_resume(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, b"resume bytes").await.unwrap();
        path
    }

    #[tokio::test]
    async fn submit_links_application_to_private_resume_asset() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let blobs = test_blobs(&dir);
        let resume = write_resume(&dir, "cv.pdf").await;

        let application = ApplicationService::submit(
            &db,
            &blobs,
            form("Ada Lovelace", "ada@example.com", "Software Engineer"),
            &resume,
            "cv.pdf",
            "application/pdf",
        )
        .await
        .unwrap();

        let asset = MediaService::resolve(&db, &application.resume_asset_id)
            .await
            .unwrap();
        assert_eq!(asset.kind, "resume");
        assert!(!asset.is_public);
        assert_eq!(asset.created_by.as_deref(), Some("careers_form:ada@example.com"));

        let on_disk = blobs.absolute_path(Visibility::Private, &asset.storage_path);
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"resume bytes");
    }

    #[tokio::test]
    async fn role_filter_is_case_insensitive_substring() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let blobs = test_blobs(&dir);

        for (name, position) in [
            ("Ada Lovelace", "Software Engineer"),
            ("Grace Hopper", "Technical Writer"),
        ] {
            let resume = write_resume(&dir, &format!("{}.pdf", name)).await;
            ApplicationService::submit(
                &db,
                &blobs,
                form(name, "a@b.test", position),
                &resume,
                "cv.pdf",
                "application/pdf",
            )
            .await
            .unwrap();
        }

        let all = ApplicationService::list(&db, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let engineers = ApplicationService::list(&db, Some("engineer")).await.unwrap();
        assert_eq!(engineers.len(), 1);
        assert_eq!(engineers[0].position, "Software Engineer");

        let shouting = ApplicationService::list(&db, Some("ENGINEER")).await.unwrap();
        assert_eq!(shouting.len(), 1);

        let none = ApplicationService::list(&db, Some("designer")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn rejected_mime_type_creates_no_rows() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;
        let blobs = test_blobs(&dir);
        let resume = write_resume(&dir, "notes.txt").await;

        let err = ApplicationService::submit(
            &db,
            &blobs,
            form("Mallory", "m@example.com", "Software Engineer"),
            &resume,
            "notes.txt",
            "text/plain",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let (assets,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM media_assets")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let (applications,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM career_applications")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(assets, 0);
        assert_eq!(applications, 0);
    }
}
