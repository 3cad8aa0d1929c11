use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;

/// Append-only log of gated private downloads
pub struct AuditService;

impl AuditService {
    /// Record one download of a private asset
    pub async fn record(db: &Database, asset_id: &str, downloaded_by: &str) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO download_audits (id, asset_id, downloaded_at, downloaded_by)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(asset_id)
        .bind(&now)
        .bind(downloaded_by)
        .execute(db.pool())
        .await?;

        Ok(())
    }
}
