use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Career application row
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CareerApplication {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub message: Option<String>,
    pub resume_asset_id: String,
    pub created_at: String,
}

/// Applicant-supplied form fields (the resume file travels separately)
#[derive(Debug, Clone)]
pub struct ApplicationForm {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub message: Option<String>,
}

/// Admin listing query parameters
#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    /// Case-insensitive substring filter on position
    pub role: Option<String>,
}
