use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use crate::error::{ApiResponse, AppError, Result};
use crate::middleware::admin::verify_admin_api_key;
use crate::models::{
    ContentUpdateResponse, ContentVersionInfo, HomeLayoutResponse, HomeLayoutUpdate,
};
use crate::services::ContentService;
use crate::AppState;

/// GET /api/content
///
/// Public: the frontend renders the site from this document.
pub async fn get_content(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>> {
    let content = ContentService::load_latest(&state.db).await?;
    Ok(Json(ApiResponse::success(content)))
}

/// PUT /api/content
///
/// Admin: replace the entire content document as a new version.
pub async fn update_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new_content): Json<Value>,
) -> Result<Json<ApiResponse<ContentUpdateResponse>>> {
    verify_admin_api_key(&state.config, &headers)?;

    if !new_content.is_object() {
        return Err(AppError::Validation(
            "Content document must be a JSON object".to_string(),
        ));
    }

    let version = ContentService::save(&state.db, &new_content, Some("admin")).await?;
    Ok(Json(ApiResponse::success(ContentUpdateResponse { version })))
}

/// GET /api/content/versions
pub async fn list_versions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ContentVersionInfo>>>> {
    let versions = ContentService::list_versions(&state.db).await?;
    Ok(Json(ApiResponse::success(versions)))
}

/// POST /api/content/rollback/:version
///
/// Admin: restore a prior version's document as a new top version.
pub async fn rollback_content(
    State(state): State<AppState>,
    Path(version): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ContentUpdateResponse>>> {
    verify_admin_api_key(&state.config, &headers)?;

    let new_version = ContentService::rollback(&state.db, version).await?;
    Ok(Json(ApiResponse::success(ContentUpdateResponse {
        version: new_version,
    })))
}

/// GET /api/admin/home-layout
pub async fn get_home_layout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<HomeLayoutResponse>>> {
    verify_admin_api_key(&state.config, &headers)?;

    let layout_variant = ContentService::home_layout(&state.db).await?;
    Ok(Json(ApiResponse::success(HomeLayoutResponse {
        layout_variant,
        version: None,
    })))
}

/// PUT /api/admin/home-layout
pub async fn update_home_layout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<HomeLayoutUpdate>,
) -> Result<Json<ApiResponse<HomeLayoutResponse>>> {
    verify_admin_api_key(&state.config, &headers)?;

    let version = ContentService::set_home_layout(&state.db, &req.layout_variant).await?;
    Ok(Json(ApiResponse::success(HomeLayoutResponse {
        layout_variant: req.layout_variant,
        version: Some(version),
    })))
}
