//! Axum route handlers for the job/candidate CRUD surface.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::candidate::CandidateApplication;
use crate::models::job::JobPosting;
use crate::state::AppState;
use crate::store::normalize;

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobPosting>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct CandidateListResponse {
    pub candidates: Vec<CandidateApplication>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub success: bool,
    pub job_id: String,
    pub folder_name: String,
    pub has_resume: bool,
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = state.store.list_jobs().await?;
    let count = jobs.len();
    Ok(Json(JobListResponse { jobs, count }))
}

/// GET /api/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobPosting>, AppError> {
    let job = state
        .store
        .get_job(&job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job '{job_id}' not found")))?;
    Ok(Json(job))
}

/// GET /api/candidates/:job_id
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let candidates = state.store.list_candidates(&job_id).await?;
    let count = candidates.len();
    Ok(Json(CandidateListResponse { candidates, count }))
}

/// POST /api/applications/:job_id
///
/// Multipart form: an `application` part holding the candidate JSON and an
/// optional `resume` part holding a PDF.
pub async fn handle_submit_application(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let mut application_json: Option<String> = None;
    let mut resume_pdf: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("application") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable application part: {e}")))?;
                application_json = Some(text);
            }
            Some("resume") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable resume part: {e}")))?;
                if !bytes.starts_with(b"%PDF") {
                    return Err(AppError::Validation(
                        "Resume must be a PDF file".to_string(),
                    ));
                }
                resume_pdf = Some(bytes);
            }
            _ => {} // unknown parts are ignored
        }
    }

    let application_json = application_json
        .ok_or_else(|| AppError::Validation("Missing 'application' part".to_string()))?;
    let candidate = parse_application(&application_json)?;

    let stored = state
        .store
        .save_application(&job_id, &candidate, resume_pdf)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            success: true,
            job_id: stored.job_id,
            folder_name: stored.folder_name,
            has_resume: stored.has_resume,
        }),
    ))
}

/// Parses a submitted application, normalizing non-standard shapes, and
/// enforces the minimum identity fields.
fn parse_application(raw: &str) -> Result<CandidateApplication, AppError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Application is not valid JSON: {e}")))?;

    let normalized = normalize::normalize_candidate(&value);
    let mut candidate: CandidateApplication = serde_json::from_value(normalized)
        .map_err(|e| AppError::Validation(format!("Application does not match schema: {e}")))?;

    if candidate.application_date.trim().is_empty() {
        candidate.application_date = Utc::now().format("%Y-%m-%d").to_string();
    }

    if candidate.personal_info.first_name.trim().is_empty()
        || candidate.personal_info.last_name.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Applicant first and last name are required".to_string(),
        ));
    }
    if candidate.personal_info.email.trim().is_empty() {
        return Err(AppError::Validation(
            "Applicant email is required".to_string(),
        ));
    }

    Ok(candidate)
}
