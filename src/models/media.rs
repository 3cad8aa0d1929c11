use serde::Serialize;
use sqlx::FromRow;
use std::path::PathBuf;

/// Registry record describing one stored blob
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaAsset {
    pub id: String,
    pub kind: String,
    pub storage_path: String,
    pub mime_type: Option<String>,
    pub size_bytes: i64,
    pub sha256_hash: String,
    pub is_public: bool,
    pub created_at: String,
    pub created_by: Option<String>,
}

/// Fields for registering a freshly stored blob
#[derive(Debug, Clone)]
pub struct NewMediaAsset {
    pub kind: String,
    pub storage_path: String,
    pub mime_type: Option<String>,
    pub size_bytes: i64,
    pub sha256_hash: String,
    pub is_public: bool,
    pub created_by: Option<String>,
}

/// Public upload response
#[derive(Debug, Serialize)]
pub struct MediaUploadResponse {
    pub id: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub storage_path: String,
}

/// Everything the boundary layer needs to stream a verified private file
#[derive(Debug)]
pub struct PrivateFile {
    pub path: PathBuf,
    pub mime_type: String,
    pub filename: String,
}
