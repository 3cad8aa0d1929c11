use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One immutable snapshot of the site content document
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentVersion {
    pub id: String,
    pub version: i64,
    pub content_json: String,
    pub created_at: String,
    pub created_by: Option<String>,
}

/// Version metadata for listings
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentVersionInfo {
    pub id: String,
    pub version: i64,
    pub created_at: String,
}

/// Response after replacing or rolling back content
#[derive(Debug, Serialize)]
pub struct ContentUpdateResponse {
    pub version: i64,
}

/// Home layout update request
#[derive(Debug, Deserialize)]
pub struct HomeLayoutUpdate {
    pub layout_variant: String,
}

/// Home layout response
#[derive(Debug, Serialize)]
pub struct HomeLayoutResponse {
    pub layout_variant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}
