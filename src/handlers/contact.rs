use axum::Json;

use crate::error::{ApiResponse, AppError, Result};
use crate::models::ContactRequest;

/// POST /api/contact
///
/// Public: accepted submissions are logged only; the email/CRM hookup lives
/// outside this service.
pub async fn submit_contact(Json(req): Json<ContactRequest>) -> Result<Json<ApiResponse<()>>> {
    if req.name.trim().is_empty() || req.subject.trim().is_empty() || req.message.trim().is_empty()
    {
        return Err(AppError::Validation(
            "name, subject and message are required".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    tracing::info!(
        name = %req.name,
        email = %req.email,
        subject = %req.subject,
        "New contact submission"
    );

    Ok(Json(ApiResponse::<()>::success_message(
        "Contact form submitted successfully.",
    )))
}
