//! Candidate notification endpoint.
//!
//! Email delivery is intentionally a no-op: the request is validated and
//! logged, and the response says so. Wiring a real provider is out of scope.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub job_id: String,
    pub recipients: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub success: bool,
    pub delivered: bool,
    pub recipients: usize,
    pub message: String,
}

/// POST /api/notify
pub async fn handle_notify(
    State(_state): State<AppState>,
    Json(request): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>, AppError> {
    if request.recipients.is_empty() {
        return Err(AppError::Validation(
            "At least one recipient is required".to_string(),
        ));
    }

    info!(
        "Notification requested for job {}: {} recipient(s), subject: {:?}, custom message: {}",
        request.job_id,
        request.recipients.len(),
        request.subject,
        request.message.is_some()
    );

    Ok(Json(NotifyResponse {
        success: true,
        delivered: false,
        recipients: request.recipients.len(),
        message: "Email delivery is not configured; notification logged only".to_string(),
    }))
}
