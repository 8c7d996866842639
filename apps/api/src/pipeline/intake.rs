//! Intake — extracts structured requirements from a free-text job description.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::pipeline::prompts::{INTAKE_PROMPT_TEMPLATE, INTAKE_SYSTEM_ROLE};

fn default_role_type() -> String {
    "Not specified".to_string()
}

fn default_experience() -> String {
    "Not specified".to_string()
}

/// Structured job requirements extracted by the intake stage.
///
/// The LLM may omit fields; serde defaults backfill them so downstream
/// stages never see a partially-populated object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default = "default_experience")]
    pub experience_required: String,
    #[serde(default)]
    pub education_required: Vec<String>,
    #[serde(default)]
    pub key_responsibilities: Vec<String>,
    #[serde(default = "default_role_type")]
    pub role_type: String,
    #[serde(default)]
    pub technical_requirements: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

impl JobRequirements {
    /// One-line human-readable summary, used in logs.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("Role: {}", self.role_type)];
        if !self.required_skills.is_empty() {
            let skills: Vec<&str> = self
                .required_skills
                .iter()
                .take(5)
                .map(String::as_str)
                .collect();
            parts.push(format!("Required Skills: {}", skills.join(", ")));
        }
        parts.push(format!("Experience: {}", self.experience_required));
        parts.join(" | ")
    }

    /// Multi-line rendering used inside the screening prompt.
    pub fn format_for_prompt(&self) -> String {
        let mut parts = vec![format!("Role: {}", self.role_type)];
        if !self.required_skills.is_empty() {
            parts.push(format!(
                "Required Skills: {}",
                self.required_skills.join(", ")
            ));
        }
        if !self.preferred_skills.is_empty() {
            parts.push(format!(
                "Preferred Skills: {}",
                self.preferred_skills.join(", ")
            ));
        }
        parts.push(format!(
            "Experience Required: {}",
            self.experience_required
        ));
        if !self.education_required.is_empty() {
            parts.push(format!(
                "Education Required: {}",
                self.education_required.join(", ")
            ));
        }
        if !self.technical_requirements.is_empty() {
            parts.push(format!(
                "Technical Requirements: {}",
                self.technical_requirements.join(", ")
            ));
        }
        parts.join("\n")
    }
}

/// Parses a job description into `JobRequirements` via one LLM call.
pub async fn parse_job_description(
    jd_text: &str,
    llm: &LlmClient,
) -> Result<JobRequirements, AppError> {
    let prompt = INTAKE_PROMPT_TEMPLATE.replace("{job_description}", jd_text);
    let system = format!("{INTAKE_SYSTEM_ROLE} {JSON_ONLY_SYSTEM}");
    llm.call_json::<JobRequirements>(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Job analysis failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_are_backfilled() {
        let requirements: JobRequirements = serde_json::from_str("{}").unwrap();
        assert!(requirements.required_skills.is_empty());
        assert_eq!(requirements.role_type, "Not specified");
        assert_eq!(requirements.experience_required, "Not specified");
        assert!(requirements.education_required.is_empty());
    }

    #[test]
    fn test_full_payload_deserializes() {
        let json = r#"{
            "required_skills": ["Rust", "SQL"],
            "preferred_skills": ["Kubernetes"],
            "experience_required": "5 years",
            "education_required": ["BSc Computer Science"],
            "key_responsibilities": ["Build backend services"],
            "role_type": "Senior Backend Engineer",
            "technical_requirements": ["REST APIs"],
            "soft_skills": ["Communication"]
        }"#;
        let requirements: JobRequirements = serde_json::from_str(json).unwrap();
        assert_eq!(requirements.required_skills, vec!["Rust", "SQL"]);
        assert_eq!(requirements.role_type, "Senior Backend Engineer");
    }

    #[test]
    fn test_summary_truncates_to_five_skills() {
        let requirements = JobRequirements {
            required_skills: (1..=8).map(|i| format!("skill{i}")).collect(),
            role_type: "Engineer".to_string(),
            experience_required: "3 years".to_string(),
            preferred_skills: vec![],
            education_required: vec![],
            key_responsibilities: vec![],
            technical_requirements: vec![],
            soft_skills: vec![],
        };
        let summary = requirements.summary();
        assert!(summary.contains("skill5"));
        assert!(!summary.contains("skill6"));
        assert!(summary.starts_with("Role: Engineer"));
    }

    #[test]
    fn test_format_for_prompt_skips_empty_sections() {
        let requirements: JobRequirements = serde_json::from_str(
            r#"{"required_skills": ["Rust"], "role_type": "Engineer"}"#,
        )
        .unwrap();
        let formatted = requirements.format_for_prompt();
        assert!(formatted.contains("Required Skills: Rust"));
        assert!(!formatted.contains("Preferred Skills"));
        assert!(!formatted.contains("Education Required"));
    }
}
