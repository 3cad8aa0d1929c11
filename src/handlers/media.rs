use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{ApiResponse, AppError, Result};
use crate::middleware::admin::verify_admin_api_key;
use crate::models::MediaUploadResponse;
use crate::services::MediaService;
use crate::AppState;

/// POST /api/media/upload-public
///
/// Admin multipart upload of a public site asset: file plus an optional
/// kind field (defaults to "hero_image").
pub async fn upload_public_media(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUploadResponse>>> {
    verify_admin_api_key(&state.config, &headers)?;

    let mut temp_file_path: Option<PathBuf> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut kind = "hero_image".to_string();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to process multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());

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
            "kind" => {
                let text = field.text().await.unwrap_or_default();
                if !text.is_empty() {
                    kind = text;
                }
            }
            _ => {}
        }
    }

    // The kind names a directory under the public root
    if kind.contains('/') || kind.contains('\\') || kind.contains("..") {
        return Err(AppError::Validation("Invalid media kind".to_string()));
    }

    let temp_path =
        temp_file_path.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let file_name = file_name.unwrap_or_else(|| "upload".to_string());
    let content_type = content_type
        .ok_or_else(|| AppError::Validation("Missing file content type".to_string()))?;

    let result = MediaService::upload_public(
        &state.db,
        &state.blobs,
        &temp_path,
        &file_name,
        &content_type,
        &kind,
    )
    .await;

    // Cleanup temp file
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        tracing::error!("Failed to remove temp file {:?}: {}", temp_path, e);
    }

    match result {
        Ok(response) => Ok(Json(ApiResponse::success(response))),
        Err(e) => Err(e),
    }
}

/// GET /api/admin/files/:id
///
/// Admin: stream a private asset after digest verification.
pub async fn download_private_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let caller = verify_admin_api_key(&state.config, &headers)?;

    let file =
        MediaService::fetch_private_verified(&state.db, &state.blobs, &id, &caller.label).await?;

    let data = tokio::fs::read(&file.path).await?;

    let fallback_name = file.filename.replace(['"', '\\'], "_");
    let encoded_name = urlencoding::encode(&file.filename);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type.clone())
        .header(header::CONTENT_LENGTH, data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                fallback_name, encoded_name
            ),
        )
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
