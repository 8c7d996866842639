//! Axum route handler for the shortlisting pipeline.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::pipeline::{run_shortlist, ShortlistResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    pub job_id: String,
    pub job_description: String,
}

/// POST /api/shortlist
///
/// Full pipeline: intake → screening → ranking. Responds 503 when no LLM
/// is configured (the CRUD surface stays available).
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Json(request): Json<ShortlistRequest>,
) -> Result<Json<ShortlistResult>, AppError> {
    let llm = state.llm.as_ref().ok_or(AppError::AgentsUnavailable)?;

    let result = run_shortlist(
        &state.store,
        llm,
        state.ranker.as_ref(),
        &request.job_id,
        &request.job_description,
    )
    .await?;

    Ok(Json(result))
}
