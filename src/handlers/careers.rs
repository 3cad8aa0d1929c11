use axum::{
    extract::{Multipart, Query, State},
    http::HeaderMap,
    Json,
};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{ApiResponse, AppError, Result};
use crate::middleware::admin::verify_admin_api_key;
use crate::models::{ApplicationForm, ApplicationQuery, CareerApplication};
use crate::services::ApplicationService;
use crate::AppState;

/// POST /api/careers/apply
///
/// Public multipart form: full_name, email, phone?, position, message?,
/// resume (file).
pub async fn apply(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<()>>> {
    let mut full_name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut phone: Option<String> = None;
    let mut position: Option<String> = None;
    let mut message: Option<String> = None;
    let mut temp_file_path: Option<PathBuf> = None;
    let mut resume_name: Option<String> = None;
    let mut resume_type: Option<String> = None;

    // Process multipart fields, streaming the resume to a temp file
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to process multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "resume" => {
                resume_name = field.file_name().map(|s| s.to_string());
                resume_type = field.content_type().map(|s| s.to_string());

                let temp_path =
                    std::env::temp_dir().join(format!("porchlight_upload_{}", Uuid::new_v4()));
                let mut file = tokio::fs::File::create(&temp_path).await?;

                while let Some(chunk) = field.chunk().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read file chunk: {}", e))
                })? {
                    file.write_all(&chunk).await?;
                }
                file.flush().await?;

                temp_file_path = Some(temp_path);
            }
            "full_name" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    full_name = Some(text);
                }
            }
            "email" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    email = Some(text);
                }
            }
            "phone" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    phone = Some(text);
                }
            }
            "position" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    position = Some(text);
                }
            }
            "message" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    message = Some(text);
                }
            }
            _ => {}
        }
    }

    let temp_path = temp_file_path
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;
    let form = ApplicationForm {
        full_name: full_name
            .ok_or_else(|| AppError::Validation("full_name is required".to_string()))?,
        email: email.ok_or_else(|| AppError::Validation("email is required".to_string()))?,
        phone,
        position: position
            .ok_or_else(|| AppError::Validation("position is required".to_string()))?,
        message,
    };
    let resume_filename = resume_name.unwrap_or_else(|| "resume".to_string());
    let resume_content_type =
        resume_type.unwrap_or_else(|| "application/octet-stream".to_string());

    let result = ApplicationService::submit(
        &state.db,
        &state.blobs,
        form,
        &temp_path,
        &resume_filename,
        &resume_content_type,
    )
    .await;

    // Cleanup temp file
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        tracing::error!("Failed to remove temp file {:?}: {}", temp_path, e);
    }

    match result {
        Ok(_) => Ok(Json(ApiResponse::<()>::success_message(
            "Application received successfully.",
        ))),
        Err(e) => Err(e),
    }
}

/// GET /api/admin/applications?role=engineer
pub async fn list_applications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<ApiResponse<Vec<CareerApplication>>>> {
    verify_admin_api_key(&state.config, &headers)?;

    let applications = ApplicationService::list(&state.db, query.role.as_deref()).await?;
    Ok(Json(ApiResponse::success(applications)))
}
