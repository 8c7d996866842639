//! File-system-as-database storage.
//!
//! Layout (shared with the candidate-facing tooling, do not change):
//! ```text
//! data/
//!   <job_id>/
//!     jobDescription.txt
//!     applications/
//!       <candidate_folder>/
//!         generalInformation.json
//!         resume.pdf            (optional)
//! ```

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateApplication;
use crate::models::job::JobPosting;

pub mod handlers;
pub mod normalize;

const JOB_DESCRIPTION_FILE: &str = "jobDescription.txt";
const APPLICATIONS_DIR: &str = "applications";
const CANDIDATE_INFO_FILE: &str = "generalInformation.json";
const RESUME_FILE: &str = "resume.pdf";
/// Hard cap on resume text fed into screening prompts.
const RESUME_TEXT_MAX_CHARS: usize = 4000;

/// Handle to the on-disk job/application store.
#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
}

/// Location of a freshly stored application.
#[derive(Debug, Clone)]
pub struct StoredApplication {
    pub job_id: String,
    pub folder_name: String,
    pub has_resume: bool,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Lists all jobs: one per directory containing a `jobDescription.txt`.
    pub async fn list_jobs(&self) -> Result<Vec<JobPosting>, AppError> {
        let mut jobs = Vec::new();

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(jobs),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let job_id = entry.file_name().to_string_lossy().to_string();
            let desc_path = entry.path().join(JOB_DESCRIPTION_FILE);
            match fs::read_to_string(&desc_path).await {
                Ok(description) => jobs.push(JobPosting {
                    id: job_id.clone(),
                    name: job_id,
                    description,
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(jobs)
    }

    /// Loads a single job, or `None` if the directory or description is missing.
    pub async fn get_job(&self, job_id: &str) -> Result<Option<JobPosting>, AppError> {
        let desc_path = self.job_dir(job_id)?.join(JOB_DESCRIPTION_FILE);
        match fs::read_to_string(&desc_path).await {
            Ok(description) => Ok(Some(JobPosting {
                id: job_id.to_string(),
                name: job_id.to_string(),
                description,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads every candidate's `generalInformation.json` for a job.
    ///
    /// Unreadable or unparseable candidates are skipped with a warning so one
    /// bad document cannot take down the whole listing. Legacy documents are
    /// normalized before deserialization.
    pub async fn list_candidates(
        &self,
        job_id: &str,
    ) -> Result<Vec<CandidateApplication>, AppError> {
        let applications_dir = self.job_dir(job_id)?.join(APPLICATIONS_DIR);
        let mut candidates = Vec::new();

        let mut entries = match fs::read_dir(&applications_dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(candidates),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let folder_name = entry.file_name().to_string_lossy().to_string();
            let info_path = entry.path().join(CANDIDATE_INFO_FILE);

            let raw = match fs::read_to_string(&info_path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping candidate {folder_name}: {e}");
                    continue;
                }
            };

            match parse_candidate(&raw) {
                Ok(mut candidate) => {
                    candidate.folder_name = Some(folder_name);
                    candidates.push(candidate);
                }
                Err(e) => {
                    warn!("Skipping candidate {folder_name}: invalid document: {e}");
                }
            }
        }

        candidates.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));
        Ok(candidates)
    }

    /// Persists a submitted application under a fresh slugged folder.
    ///
    /// The JSON document is written via temp-file-and-rename so a crashed
    /// request never leaves a half-written `generalInformation.json` behind.
    pub async fn save_application(
        &self,
        job_id: &str,
        candidate: &CandidateApplication,
        resume_pdf: Option<Bytes>,
    ) -> Result<StoredApplication, AppError> {
        if self.get_job(job_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Job '{job_id}' not found")));
        }

        let folder_name = application_folder_name(candidate);
        let candidate_dir = self
            .job_dir(job_id)?
            .join(APPLICATIONS_DIR)
            .join(&folder_name);
        fs::create_dir_all(&candidate_dir).await?;

        let json = serde_json::to_vec_pretty(candidate)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize candidate: {e}")))?;
        write_atomic(&candidate_dir.join(CANDIDATE_INFO_FILE), &json).await?;

        let has_resume = match resume_pdf {
            Some(bytes) => {
                write_atomic(&candidate_dir.join(RESUME_FILE), &bytes).await?;
                true
            }
            None => false,
        };

        info!(
            "Stored application {folder_name} for job {job_id} (resume: {has_resume})"
        );

        Ok(StoredApplication {
            job_id: job_id.to_string(),
            folder_name,
            has_resume,
        })
    }

    /// Extracts text from a candidate's `resume.pdf`, if one exists.
    ///
    /// Returns `None` when the file is absent or unextractable — screening
    /// proceeds on structured data alone in that case.
    pub async fn load_resume_text(&self, job_id: &str, folder_name: &str) -> Option<String> {
        let job_dir = self.job_dir(job_id).ok()?;
        if !is_safe_path_component(folder_name) {
            return None;
        }
        let resume_path = job_dir
            .join(APPLICATIONS_DIR)
            .join(folder_name)
            .join(RESUME_FILE);

        let bytes = fs::read(&resume_path).await.ok()?;
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
        })
        .await
        .ok()?
        .map_err(|e| warn!("Resume extraction failed for {folder_name}: {e}"))
        .ok()?;

        let truncated: String = text.chars().take(RESUME_TEXT_MAX_CHARS).collect();
        let truncated = truncated.trim().to_string();
        if truncated.is_empty() {
            None
        } else {
            Some(truncated)
        }
    }

    fn job_dir(&self, job_id: &str) -> Result<PathBuf, AppError> {
        if !is_safe_path_component(job_id) {
            return Err(AppError::Validation(format!(
                "Invalid job id '{job_id}'"
            )));
        }
        Ok(self.root.join(job_id))
    }
}

/// Candidate folder name: `First_Last_xxxxxxxx`, restricted to safe characters.
fn application_folder_name(candidate: &CandidateApplication) -> String {
    let slug = format!(
        "{}_{}",
        candidate.personal_info.first_name, candidate.personal_info.last_name
    );
    let slug: String = slug
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    let suffix = Uuid::new_v4().simple().to_string();
    if slug.is_empty() {
        format!("applicant_{}", &suffix[..8])
    } else {
        format!("{}_{}", slug, &suffix[..8])
    }
}

/// Rejects path components that could escape the data root.
fn is_safe_path_component(component: &str) -> bool {
    !component.is_empty()
        && component != "."
        && component != ".."
        && !component.contains('/')
        && !component.contains('\\')
        && !component.contains('\0')
}

fn parse_candidate(raw: &str) -> Result<CandidateApplication, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    // Strict first; fall back to the normalizer for legacy shapes.
    if normalize::validate_structure(&value).is_valid() {
        if let Ok(candidate) = serde_json::from_value(value.clone()) {
            return Ok(candidate);
        }
    }
    serde_json::from_value(normalize::normalize_candidate(&value))
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
