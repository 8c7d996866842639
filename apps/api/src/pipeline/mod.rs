// Shortlisting pipeline.
// Implements: job intake parsing, per-candidate screening, ranking/shortlisting.
// All LLM calls go through llm_client — no direct API calls here.

pub mod handlers;
pub mod intake;
pub mod prompts;
pub mod ranking;
pub mod screening;

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::pipeline::intake::{parse_job_description, JobRequirements};
use crate::pipeline::ranking::{Ranker, RankingSummary, ShortlistedCandidate};
use crate::pipeline::screening::screen_batch;
use crate::store::JobStore;

/// Minimum JD length accepted by the shortlist endpoint.
const MIN_JD_LENGTH: usize = 10;

/// Final payload of the shortlisting pipeline.
#[derive(Debug, Serialize)]
pub struct ShortlistResult {
    pub success: bool,
    pub shortlisted_candidates: Vec<ShortlistedCandidate>,
    pub summary: RankingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_requirements: Option<JobRequirements>,
    pub total_candidates_reviewed: usize,
    pub total_shortlisted: usize,
    pub ranker_backend: String,
    pub fallback_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ShortlistResult {
    fn empty(total_reviewed: usize, message: &str) -> Self {
        ShortlistResult {
            success: true,
            shortlisted_candidates: vec![],
            summary: RankingSummary {
                total_candidates_reviewed: total_reviewed,
                total_shortlisted: 0,
                top_skills_found: vec![],
                overall_candidate_quality: "unknown".to_string(),
            },
            job_requirements: None,
            total_candidates_reviewed: total_reviewed,
            total_shortlisted: 0,
            ranker_backend: "none".to_string(),
            fallback_used: false,
            message: Some(message.to_string()),
        }
    }
}

/// Validates the raw job description before any LLM spend.
pub fn validate_job_description(jd_text: &str) -> Result<(), AppError> {
    if jd_text.trim().len() < MIN_JD_LENGTH {
        return Err(AppError::Validation(
            "Job description is too short".to_string(),
        ));
    }
    Ok(())
}

/// Runs the full shortlisting pipeline for one job.
///
/// Steps:
/// 1. load candidates from the store
/// 2. intake: JD text → JobRequirements
/// 3. screening: one LLM call per candidate (resume excerpt attached when present)
/// 4. ranking: validated LLM shortlist or deterministic fallback
pub async fn run_shortlist(
    store: &JobStore,
    llm: &LlmClient,
    ranker: &dyn Ranker,
    job_id: &str,
    job_description: &str,
) -> Result<ShortlistResult, AppError> {
    validate_job_description(job_description)?;

    // Step 1: candidates
    let candidates = store.list_candidates(job_id).await?;
    if candidates.is_empty() {
        return Ok(ShortlistResult::empty(
            0,
            "No candidates found in the system",
        ));
    }

    // Step 2: intake
    info!("Parsing job description for job {job_id}");
    let requirements = parse_job_description(job_description, llm).await?;
    info!("Job requirements extracted: {}", requirements.summary());

    // Step 3: screening
    info!("Screening {} candidates for job {job_id}", candidates.len());
    let mut items = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let resume_text = match candidate.folder_name.as_deref() {
            Some(folder) => store.load_resume_text(job_id, folder).await,
            None => None,
        };
        items.push((candidate, resume_text));
    }
    let screened = screen_batch(llm, &items, &requirements).await;
    info!("Screening complete: {} candidates evaluated", screened.len());

    // Step 4: ranking
    let outcome = ranker.rank(job_description, &screened).await?;
    info!(
        "Shortlisting complete: {} of {} candidates (backend: {}, fallback: {})",
        outcome.shortlisted.len(),
        screened.len(),
        outcome.ranker_backend,
        outcome.fallback_used
    );

    let total_shortlisted = outcome.shortlisted.len();
    Ok(ShortlistResult {
        success: true,
        shortlisted_candidates: outcome.shortlisted,
        summary: outcome.summary,
        job_requirements: Some(requirements),
        total_candidates_reviewed: screened.len(),
        total_shortlisted,
        ranker_backend: outcome.ranker_backend,
        fallback_used: outcome.fallback_used,
        message: None,
    })
}
