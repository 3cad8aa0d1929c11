use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{ContentVersion, ContentVersionInfo};

/// Attempts before a save loses to concurrent writers for good
const MAX_SAVE_ATTEMPTS: usize = 5;

/// Layout variants the hero section understands
pub const LAYOUT_VARIANTS: [&str; 2] = ["classic", "sleek"];

/// Append-only version log for the site content document
pub struct ContentService;

impl ContentService {
    /// Document used to seed an empty version log
    pub fn default_content() -> Value {
        json!({
            "hero": {
                "headline": "Helping clients build modern solutions.",
                "subheadline": "Short value prop about what the business actually does.",
                "primaryCtaLabel": "Get in touch",
                "primaryCtaHref": "/contact",
                "layoutVariant": "classic",
            },
            "about": {
                "title": "About Us",
                "body": [
                    "Tell the story of the business, mission, vision, and what makes them different.",
                    "Add timeline, credentials, certifications, or leadership bios here later.",
                ],
            },
            "services": [
                { "title": "Service One", "description": "Short description of service one." },
                { "title": "Service Two", "description": "Short description of service two." },
                { "title": "Service Three", "description": "Short description of service three." },
            ],
            "careers": {
                "intro": "We hire smart, self-directed people who thrive in modern cloud, security, and consulting environments.",
                "positions": [
                    {
                        "title": "Software Engineer",
                        "summary": "Build modern cloud-native applications using DevSecOps best practices.",
                        "tags": ["Cloud", "DevSecOps", "Backend", "Full-Stack"],
                    },
                    {
                        "title": "Technical Writer",
                        "summary": "Create clear, accurate documentation for security processes, cloud architectures, and technical deliverables.",
                        "tags": ["Writing", "Documentation", "Security"],
                    },
                    {
                        "title": "Business Analyst",
                        "summary": "Work with clients to gather requirements, translate needs into technical documentation, and support delivery teams.",
                        "tags": ["Analysis", "Consulting", "Process"],
                    },
                    {
                        "title": "General Application",
                        "summary": "If your skillset doesn't fit a listed role, submit a general application.",
                        "tags": ["General"],
                    },
                ],
            },
            "contact": {
                "intro": "Have questions or want to discuss a project? Send us a message.",
                "email": "info@example.com",
                "phone": "+1 (555) 555-5555",
                "address": "123 Business Street, City, State",
            },
        })
    }

    async fn latest_row(db: &Database) -> Result<Option<ContentVersion>> {
        let row: Option<ContentVersion> =
            sqlx::query_as("SELECT * FROM content_versions ORDER BY version DESC LIMIT 1")
                .fetch_optional(db.pool())
                .await?;
        Ok(row)
    }

    /// Latest content document, seeding version 1 when the log is empty
    pub async fn load_latest(db: &Database) -> Result<Value> {
        if let Some(row) = Self::latest_row(db).await? {
            return Ok(serde_json::from_str(&row.content_json)?);
        }

        // Lazy bootstrap. If a concurrent writer seeded first, the unique
        // version index rejects ours and we read back whatever won.
        let default = Self::default_content();
        match Self::insert_version(db, 1, &default, None).await {
            Ok(()) => Ok(default),
            Err(AppError::Conflict(_)) => {
                let row = Self::latest_row(db).await?.ok_or_else(|| {
                    AppError::Internal("Content log empty after losing seed race".to_string())
                })?;
                Ok(serde_json::from_str(&row.content_json)?)
            }
            Err(e) => Err(e),
        }
    }

    /// Append a new full-document snapshot and return its version number.
    ///
    /// Read-max-then-insert is not atomic; the unique index on version makes
    /// the losing writer fail, and we retry a bounded number of times.
    pub async fn save(db: &Database, content: &Value, created_by: Option<&str>) -> Result<i64> {
        let mut attempt = 0;
        loop {
            let (current,): (i64,) =
                sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM content_versions")
                    .fetch_one(db.pool())
                    .await?;
            let next = current + 1;

            match Self::insert_version(db, next, content, created_by).await {
                Ok(()) => return Ok(next),
                Err(AppError::Conflict(msg)) => {
                    attempt += 1;
                    if attempt >= MAX_SAVE_ATTEMPTS {
                        return Err(AppError::Conflict(msg));
                    }
                    tracing::debug!(
                        "Content version {} taken by a concurrent writer, retrying",
                        next
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn insert_version(
        db: &Database,
        version: i64,
        content: &Value,
        created_by: Option<&str>,
    ) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let content_json = serde_json::to_string(content)?;

        let result = sqlx::query(
            r#"
            INSERT INTO content_versions (id, version, content_json, created_at, created_by)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(version)
        .bind(&content_json)
        .bind(&now)
        .bind(created_by)
        .execute(db.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let is_version_conflict = match &e {
                    sqlx::Error::Database(db_err) => db_err
                        .message()
                        .contains("UNIQUE constraint failed: content_versions.version"),
                    _ => false,
                };
                if is_version_conflict {
                    Err(AppError::Conflict(format!(
                        "Content version {} already exists",
                        version
                    )))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// Version metadata, newest first
    pub async fn list_versions(db: &Database) -> Result<Vec<ContentVersionInfo>> {
        let versions: Vec<ContentVersionInfo> = sqlx::query_as(
            "SELECT id, version, created_at FROM content_versions ORDER BY version DESC",
        )
        .fetch_all(db.pool())
        .await?;
        Ok(versions)
    }

    /// Re-save a prior version's document as a fresh top version.
    /// History is never rewritten, only extended.
    pub async fn rollback(db: &Database, target_version: i64) -> Result<i64> {
        let target: Option<ContentVersion> =
            sqlx::query_as("SELECT * FROM content_versions WHERE version = ?")
                .bind(target_version)
                .fetch_optional(db.pool())
                .await?;

        let target = target.ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;
        let content: Value = serde_json::from_str(&target.content_json)?;

        Self::save(db, &content, Some("admin")).await
    }

    /// Current hero layout variant
    pub async fn home_layout(db: &Database) -> Result<String> {
        let doc = Self::load_latest(db).await?;
        Ok(doc
            .get("hero")
            .and_then(|hero| hero.get("layoutVariant"))
            .and_then(|v| v.as_str())
            .unwrap_or("classic")
            .to_string())
    }

    /// Set hero.layoutVariant via a full-document read-modify-write.
    /// The storage layer only ever sees whole snapshots.
    pub async fn set_home_layout(db: &Database, variant: &str) -> Result<i64> {
        if !LAYOUT_VARIANTS.contains(&variant) {
            return Err(AppError::Validation(format!(
                "Unknown layout variant '{}'. Allowed: classic, sleek.",
                variant
            )));
        }

        let mut doc = Self::load_latest(db).await?;
        let root = doc
            .as_object_mut()
            .ok_or_else(|| AppError::Internal("Content document is not a JSON object".to_string()))?;

        let hero = root.entry("hero").or_insert_with(|| json!({}));
        if !hero.is_object() {
            *hero = json!({});
        }
        hero["layoutVariant"] = json!(variant);

        Self::save(db, &doc, Some("admin")).await
    }
}
