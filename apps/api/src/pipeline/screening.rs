//! Screening — evaluates individual candidates against extracted job requirements.
//!
//! One LLM call per candidate. The model's output is validated for
//! score-vs-recommendation consistency and repaired when the two disagree;
//! the numeric score is treated as authoritative.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::candidate::CandidateApplication;
use crate::pipeline::intake::JobRequirements;
use crate::pipeline::prompts::{
    RESUME_EXCERPT_HEADER, SCREENING_PROMPT_TEMPLATE, SCREENING_SYSTEM_ROLE,
};

/// Screening recommendation bands. The numeric `match_score` is authoritative;
/// a recommendation outside its band is repaired to the band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongMatch,
    GoodMatch,
    PotentialMatch,
    #[default]
    NotRecommended,
    /// Screening failed for this candidate (LLM or parse error).
    Error,
}

impl Recommendation {
    /// Band thresholds: 85+ strong, 70-84 good, 50-69 potential, below 50 not recommended.
    pub fn for_score(score: u32) -> Self {
        match score {
            85.. => Recommendation::StrongMatch,
            70..=84 => Recommendation::GoodMatch,
            50..=69 => Recommendation::PotentialMatch,
            _ => Recommendation::NotRecommended,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsMatch {
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub match_percentage: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceMatch {
    #[serde(default)]
    pub is_qualified: bool,
    #[serde(default)]
    pub years_gap: i32,
    #[serde(default)]
    pub relevance_score: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationMatch {
    #[serde(default)]
    pub meets_requirements: bool,
    #[serde(default)]
    pub education_score: u32,
}

/// Full screening result for one candidate. The contact and identity fields
/// are attached from the application document after the LLM call, never
/// trusted from the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreeningResult {
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_email: String,
    #[serde(default)]
    pub candidate_phone: String,
    #[serde(default)]
    pub target_role: String,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub match_score: u32,
    #[serde(default)]
    pub skills_match: SkillsMatch,
    #[serde(default)]
    pub experience_match: ExperienceMatch,
    #[serde(default)]
    pub education_match: EducationMatch,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub overall_assessment: String,
    #[serde(default)]
    pub recommendation: Recommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScreeningResult {
    /// Error placeholder so a failed screening keeps its slot in the batch.
    pub fn error(candidate_name: String, message: String) -> Self {
        ScreeningResult {
            candidate_name,
            match_score: 0,
            recommendation: Recommendation::Error,
            error: Some(message),
            ..Default::default()
        }
    }
}

/// Clamps the score to 0-100 and realigns the recommendation with its band.
/// Returns true if anything was repaired.
pub fn repair_consistency(result: &mut ScreeningResult) -> bool {
    let mut repaired = false;

    if result.match_score > 100 {
        result.match_score = 100;
        repaired = true;
    }

    let expected = Recommendation::for_score(result.match_score);
    if result.recommendation != expected && result.recommendation != Recommendation::Error {
        result.recommendation = expected;
        repaired = true;
    }

    repaired
}

/// Prompt-ready rendering of one candidate's structured data.
#[derive(Debug, Clone)]
pub struct CandidateInfo {
    pub name: String,
    pub target_role: String,
    pub years_experience: u32,
    pub education: String,
    pub skills: String,
    pub experience: String,
    pub certifications: String,
}

/// Flattens a candidate document into the strings the screening prompt expects.
pub fn format_candidate_info(candidate: &CandidateApplication) -> CandidateInfo {
    let education = if candidate.education.is_empty() {
        "Not specified".to_string()
    } else {
        candidate
            .education
            .iter()
            .map(|e| format!("{} in {} from {}", e.degree, e.field, e.institution))
            .collect::<Vec<_>>()
            .join("; ")
    };

    let experience = if candidate.experience.is_empty() {
        "Not specified".to_string()
    } else {
        candidate
            .experience
            .iter()
            .map(|e| format!("{} at {}: {}", e.title, e.company, e.description))
            .collect::<Vec<_>>()
            .join("; ")
    };

    let all_skills = candidate.skills.all();
    let skills = if all_skills.is_empty() {
        "Not specified".to_string()
    } else {
        all_skills.join(", ")
    };

    let certifications = if candidate.certifications.is_empty() {
        "None".to_string()
    } else {
        candidate.certifications.join(", ")
    };

    CandidateInfo {
        name: candidate.full_name(),
        target_role: if candidate.target_role.is_empty() {
            "Not specified".to_string()
        } else {
            candidate.target_role.clone()
        },
        years_experience: candidate.years_of_experience,
        education,
        skills,
        experience,
        certifications,
    }
}

/// Screens a single candidate. `resume_text` is an optional extracted excerpt
/// from the candidate's uploaded PDF.
pub async fn screen_candidate(
    llm: &LlmClient,
    candidate: &CandidateApplication,
    requirements: &JobRequirements,
    resume_text: Option<&str>,
) -> Result<ScreeningResult, AppError> {
    let info = format_candidate_info(candidate);

    let resume_excerpt = match resume_text {
        Some(text) => format!("\n{RESUME_EXCERPT_HEADER}\n{text}\n"),
        None => String::new(),
    };

    let prompt = SCREENING_PROMPT_TEMPLATE
        .replace("{job_requirements}", &requirements.format_for_prompt())
        .replace("{candidate_name}", &info.name)
        .replace("{target_role}", &info.target_role)
        .replace("{years_experience}", &info.years_experience.to_string())
        .replace("{education}", &info.education)
        .replace("{skills}", &info.skills)
        .replace("{experience}", &info.experience)
        .replace("{certifications}", &info.certifications)
        .replace("{resume_excerpt}", &resume_excerpt);

    let system = format!("{SCREENING_SYSTEM_ROLE} {JSON_ONLY_SYSTEM}");
    let mut result: ScreeningResult = llm
        .call_json(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Screening failed for {}: {e}", info.name)))?;

    if repair_consistency(&mut result) {
        warn!(
            "Repaired screening output for {}: score {} now maps to {:?}",
            info.name, result.match_score, result.recommendation
        );
    }

    // Identity and contact come from the application document, not the model.
    result.candidate_name = info.name;
    result.candidate_email = candidate.personal_info.email.clone();
    result.candidate_phone = candidate.personal_info.phone.clone();
    result.target_role = info.target_role;
    result.years_experience = info.years_experience;
    result.error = None;

    Ok(result)
}

/// Screens a batch of candidates sequentially. A failed screening becomes an
/// error result with `match_score = 0` — the batch never aborts.
pub async fn screen_batch(
    llm: &LlmClient,
    items: &[(CandidateApplication, Option<String>)],
    requirements: &JobRequirements,
) -> Vec<ScreeningResult> {
    let mut results = Vec::with_capacity(items.len());

    for (candidate, resume_text) in items {
        match screen_candidate(llm, candidate, requirements, resume_text.as_deref()).await {
            Ok(result) => results.push(result),
            Err(e) => {
                warn!("Screening error for {}: {e}", candidate.full_name());
                results.push(ScreeningResult::error(
                    candidate.full_name(),
                    e.to_string(),
                ));
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{Education, Experience};

    fn screened(score: u32, recommendation: Recommendation) -> ScreeningResult {
        ScreeningResult {
            candidate_name: "Test Person".to_string(),
            match_score: score,
            recommendation,
            ..Default::default()
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Recommendation::for_score(100), Recommendation::StrongMatch);
        assert_eq!(Recommendation::for_score(85), Recommendation::StrongMatch);
        assert_eq!(Recommendation::for_score(84), Recommendation::GoodMatch);
        assert_eq!(Recommendation::for_score(70), Recommendation::GoodMatch);
        assert_eq!(Recommendation::for_score(69), Recommendation::PotentialMatch);
        assert_eq!(Recommendation::for_score(50), Recommendation::PotentialMatch);
        assert_eq!(Recommendation::for_score(49), Recommendation::NotRecommended);
        assert_eq!(Recommendation::for_score(0), Recommendation::NotRecommended);
    }

    #[test]
    fn test_repair_realigns_recommendation_with_score() {
        let mut result = screened(90, Recommendation::NotRecommended);
        assert!(repair_consistency(&mut result));
        assert_eq!(result.recommendation, Recommendation::StrongMatch);
    }

    #[test]
    fn test_repair_clamps_score_above_100() {
        let mut result = screened(140, Recommendation::StrongMatch);
        assert!(repair_consistency(&mut result));
        assert_eq!(result.match_score, 100);
        assert_eq!(result.recommendation, Recommendation::StrongMatch);
    }

    #[test]
    fn test_repair_leaves_consistent_result_alone() {
        let mut result = screened(75, Recommendation::GoodMatch);
        assert!(!repair_consistency(&mut result));
        assert_eq!(result.match_score, 75);
    }

    #[test]
    fn test_repair_preserves_error_marker() {
        let mut result = ScreeningResult::error("X Y".to_string(), "boom".to_string());
        repair_consistency(&mut result);
        assert_eq!(result.recommendation, Recommendation::Error);
    }

    #[test]
    fn test_recommendation_serde_is_snake_case() {
        let json = serde_json::to_string(&Recommendation::StrongMatch).unwrap();
        assert_eq!(json, "\"strong_match\"");
        let parsed: Recommendation = serde_json::from_str("\"not_recommended\"").unwrap();
        assert_eq!(parsed, Recommendation::NotRecommended);
    }

    #[test]
    fn test_llm_payload_deserializes_without_contact_fields() {
        let json = r#"{
            "match_score": 82,
            "skills_match": {"matched_skills": ["Rust"], "missing_skills": [], "match_percentage": 80},
            "experience_match": {"is_qualified": true, "years_gap": 0, "relevance_score": 85},
            "education_match": {"meets_requirements": true, "education_score": 90},
            "strengths": ["systems background"],
            "weaknesses": [],
            "overall_assessment": "Solid candidate",
            "recommendation": "good_match"
        }"#;
        let result: ScreeningResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.match_score, 82);
        assert_eq!(result.recommendation, Recommendation::GoodMatch);
        assert!(result.candidate_email.is_empty());
    }

    #[test]
    fn test_error_result_shape() {
        let result = ScreeningResult::error("A B".to_string(), "timeout".to_string());
        assert_eq!(result.match_score, 0);
        assert_eq!(result.recommendation, Recommendation::Error);
        assert_eq!(result.error.as_deref(), Some("timeout"));
    }

    fn full_candidate() -> CandidateApplication {
        let mut candidate = CandidateApplication::default();
        candidate.personal_info.first_name = "Ada".to_string();
        candidate.personal_info.last_name = "Lovelace".to_string();
        candidate.personal_info.email = "ada@example.com".to_string();
        candidate.target_role = "Backend Engineer".to_string();
        candidate.years_of_experience = 9;
        candidate.education.push(Education {
            degree: "BSc".to_string(),
            field: "Mathematics".to_string(),
            institution: "UCL".to_string(),
            ..Default::default()
        });
        candidate.experience.push(Experience {
            title: "Analyst".to_string(),
            company: "Babbage & Co".to_string(),
            description: "Algorithm design".to_string(),
            ..Default::default()
        });
        candidate.skills.programming = vec!["Rust".to_string(), "Python".to_string()];
        candidate.certifications = vec!["AWS SAA".to_string()];
        candidate
    }

    #[test]
    fn test_format_candidate_info() {
        let info = format_candidate_info(&full_candidate());
        assert_eq!(info.name, "Ada Lovelace");
        assert_eq!(info.education, "BSc in Mathematics from UCL");
        assert_eq!(info.skills, "Rust, Python");
        assert_eq!(info.experience, "Analyst at Babbage & Co: Algorithm design");
        assert_eq!(info.certifications, "AWS SAA");
        assert_eq!(info.years_experience, 9);
    }

    #[test]
    fn test_format_candidate_info_empty_sections() {
        let info = format_candidate_info(&CandidateApplication::default());
        assert_eq!(info.education, "Not specified");
        assert_eq!(info.skills, "Not specified");
        assert_eq!(info.experience, "Not specified");
        assert_eq!(info.certifications, "None");
        assert_eq!(info.target_role, "Not specified");
    }
}
