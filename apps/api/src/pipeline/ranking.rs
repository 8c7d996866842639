//! Ranking — pluggable, trait-based ranker that turns screening results into
//! a final shortlist.
//!
//! Default: `LlmRanker` (one LLM call, validated against the screening data,
//! with a fully deterministic fallback). `ScoreSortRanker` is the fallback
//! algorithm exposed as its own backend — swap via RANKER_BACKEND env.
//!
//! `AppState` holds an `Arc<dyn Ranker>`, selected at startup.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::pipeline::prompts::{RANKING_PROMPT_TEMPLATE, RANKING_SYSTEM_ROLE};
use crate::pipeline::screening::{Recommendation, ScreeningResult};

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all ranker backends)
// ────────────────────────────────────────────────────────────────────────────

/// One shortlisted candidate in final rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistedCandidate {
    pub candidate_name: String,
    #[serde(default)]
    pub match_score: u32,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub recommendation_reason: String,
    #[serde(default)]
    pub interview_focus_areas: Vec<String>,
    // Backfilled from screening — never taken from the model.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

fn default_quality() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSummary {
    #[serde(default)]
    pub total_candidates_reviewed: usize,
    #[serde(default)]
    pub total_shortlisted: usize,
    #[serde(default)]
    pub top_skills_found: Vec<String>,
    #[serde(default = "default_quality")]
    pub overall_candidate_quality: String,
}

/// Full ranking outcome returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct RankingOutcome {
    pub shortlisted: Vec<ShortlistedCandidate>,
    pub summary: RankingSummary,
    pub ranker_backend: String, // "llm" | "score_sort" — for transparency
    pub fallback_used: bool,
}

/// Wire shape of the ranking LLM response.
#[derive(Debug, Deserialize)]
struct LlmRankingResponse {
    #[serde(default)]
    shortlisted_candidates: Vec<ShortlistedCandidate>,
    #[serde(default)]
    summary: Option<RankingSummary>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The ranker trait. Implement this to swap backends without touching the
/// endpoint, handler, or orchestration code.
///
/// Carried in `AppState` as `Arc<dyn Ranker>`.
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(
        &self,
        job_description: &str,
        screened: &[ScreeningResult],
    ) -> Result<RankingOutcome, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// ScoreSortRanker — the deterministic algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Pure sort-and-truncate ranker. Fast, deterministic, no LLM call.
///
/// Algorithm:
/// 1. Drop error results, then drop scores below `min_score`
/// 2. Sort by score descending, candidate name ascending on ties
/// 3. Truncate to `limit`, assign ranks 1..n
/// 4. Carry contact info and top-3 strengths from screening
pub struct ScoreSortRanker {
    pub min_score: u32,
    pub limit: usize,
}

#[async_trait]
impl Ranker for ScoreSortRanker {
    async fn rank(
        &self,
        _job_description: &str,
        screened: &[ScreeningResult],
    ) -> Result<RankingOutcome, AppError> {
        Ok(score_sort_shortlist(screened, self.min_score, self.limit))
    }
}

/// The deterministic shortlist used by `ScoreSortRanker` and as the
/// `LlmRanker` fallback.
pub fn score_sort_shortlist(
    screened: &[ScreeningResult],
    min_score: u32,
    limit: usize,
) -> RankingOutcome {
    let mut eligible: Vec<&ScreeningResult> = screened
        .iter()
        .filter(|r| r.recommendation != Recommendation::Error)
        .filter(|r| r.match_score >= min_score)
        .collect();

    eligible.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| a.candidate_name.cmp(&b.candidate_name))
    });
    eligible.truncate(limit);

    let shortlisted: Vec<ShortlistedCandidate> = eligible
        .iter()
        .enumerate()
        .map(|(idx, r)| ShortlistedCandidate {
            candidate_name: r.candidate_name.clone(),
            match_score: r.match_score,
            rank: idx as u32 + 1,
            key_strengths: r.strengths.iter().take(3).cloned().collect(),
            recommendation_reason: if r.overall_assessment.is_empty() {
                "Candidate meets requirements".to_string()
            } else {
                r.overall_assessment.clone()
            },
            interview_focus_areas: r.weaknesses.iter().take(2).cloned().collect(),
            email: r.candidate_email.clone(),
            phone: r.candidate_phone.clone(),
        })
        .collect();

    let summary = RankingSummary {
        total_candidates_reviewed: screened.len(),
        total_shortlisted: shortlisted.len(),
        top_skills_found: top_skills(&eligible),
        overall_candidate_quality: quality_label(&eligible),
    };

    RankingOutcome {
        shortlisted,
        summary,
        ranker_backend: "score_sort".to_string(),
        fallback_used: false,
    }
}

/// Most frequently matched skills across the eligible set, best-first, top 5.
fn top_skills(eligible: &[&ScreeningResult]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for result in eligible {
        for skill in &result.skills_match.matched_skills {
            *counts.entry(skill.as_str()).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(5).map(|(s, _)| s.to_string()).collect()
}

fn quality_label(eligible: &[&ScreeningResult]) -> String {
    if eligible.is_empty() {
        return "poor".to_string();
    }
    let avg: u32 =
        eligible.iter().map(|r| r.match_score).sum::<u32>() / eligible.len() as u32;
    match avg {
        85.. => "excellent",
        75..=84 => "good",
        60..=74 => "fair",
        _ => "poor",
    }
    .to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// LlmRanker — LLM ranking with validation and deterministic fallback
// ────────────────────────────────────────────────────────────────────────────

/// LLM-backed ranker. The model's output is validated against the screening
/// data; any violation, parse error, or API error substitutes the
/// deterministic `score_sort_shortlist` result.
pub struct LlmRanker {
    pub llm: LlmClient,
    pub min_score: u32,
    pub limit: usize,
}

#[async_trait]
impl Ranker for LlmRanker {
    async fn rank(
        &self,
        job_description: &str,
        screened: &[ScreeningResult],
    ) -> Result<RankingOutcome, AppError> {
        let valid: Vec<&ScreeningResult> = screened
            .iter()
            .filter(|r| r.recommendation != Recommendation::Error && r.match_score > 0)
            .collect();

        if valid.is_empty() {
            return Ok(RankingOutcome {
                shortlisted: vec![],
                summary: RankingSummary {
                    total_candidates_reviewed: screened.len(),
                    total_shortlisted: 0,
                    top_skills_found: vec![],
                    overall_candidate_quality: "unknown".to_string(),
                },
                ranker_backend: "llm".to_string(),
                fallback_used: false,
            });
        }

        match self.rank_via_llm(job_description, &valid).await {
            Ok(mut outcome) => {
                outcome.summary.total_candidates_reviewed = screened.len();
                outcome.summary.total_shortlisted = outcome.shortlisted.len();
                Ok(outcome)
            }
            Err(reason) => {
                warn!("LLM ranking rejected ({reason}) — using deterministic fallback");
                let mut outcome = score_sort_shortlist(screened, self.min_score, self.limit);
                outcome.ranker_backend = "llm".to_string();
                outcome.fallback_used = true;
                Ok(outcome)
            }
        }
    }
}

impl LlmRanker {
    /// One ranking call plus validation. Errors here mean "fall back", not
    /// "fail the request".
    async fn rank_via_llm(
        &self,
        job_description: &str,
        valid: &[&ScreeningResult],
    ) -> Result<RankingOutcome, String> {
        let screening_json = serde_json::to_string_pretty(
            &valid
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "name": r.candidate_name,
                        "match_score": r.match_score,
                        "skills_match": r.skills_match.match_percentage,
                        "experience_score": r.experience_match.relevance_score,
                        "strengths": r.strengths,
                        "weaknesses": r.weaknesses,
                        "recommendation": r.recommendation,
                        "assessment": r.overall_assessment,
                    })
                })
                .collect::<Vec<_>>(),
        )
        .map_err(|e| format!("serialize screening results: {e}"))?;

        let prompt = RANKING_PROMPT_TEMPLATE
            .replace("{job_description}", job_description)
            .replace("{screening_results}", &screening_json)
            .replace("{min_score}", &self.min_score.to_string());

        let system = format!("{RANKING_SYSTEM_ROLE} {JSON_ONLY_SYSTEM}");
        let response: LlmRankingResponse = self
            .llm
            .call_json(&prompt, &system)
            .await
            .map_err(|e| format!("ranking LLM call: {e}"))?;

        validate_ranking(&response.shortlisted_candidates, valid)?;

        // Validated: apply the score floor, backfill contact info, fix ranks.
        let by_name: HashMap<&str, &ScreeningResult> = valid
            .iter()
            .map(|r| (r.candidate_name.as_str(), *r))
            .collect();

        let mut shortlisted: Vec<ShortlistedCandidate> = response
            .shortlisted_candidates
            .into_iter()
            .filter(|c| c.match_score >= self.min_score)
            .take(self.limit)
            .collect();

        for (idx, candidate) in shortlisted.iter_mut().enumerate() {
            candidate.rank = idx as u32 + 1;
            if let Some(screening) = by_name.get(candidate.candidate_name.as_str()) {
                candidate.email = screening.candidate_email.clone();
                candidate.phone = screening.candidate_phone.clone();
            }
        }

        let summary = response.summary.unwrap_or(RankingSummary {
            total_candidates_reviewed: 0,
            total_shortlisted: 0,
            top_skills_found: vec![],
            overall_candidate_quality: "unknown".to_string(),
        });

        Ok(RankingOutcome {
            shortlisted,
            summary,
            ranker_backend: "llm".to_string(),
            fallback_used: false,
        })
    }
}

/// Validates the LLM shortlist against the screening data.
///
/// Violations:
/// - a candidate name not present in the screening set (or listed twice)
/// - a match_score differing from the screening score
/// - scores not in non-increasing order
pub fn validate_ranking(
    ranked: &[ShortlistedCandidate],
    screened: &[&ScreeningResult],
) -> Result<(), String> {
    let scores_by_name: HashMap<&str, u32> = screened
        .iter()
        .map(|r| (r.candidate_name.as_str(), r.match_score))
        .collect();

    let mut seen = std::collections::HashSet::new();
    let mut previous_score: Option<u32> = None;

    for candidate in ranked {
        let name = candidate.candidate_name.as_str();

        let Some(&screening_score) = scores_by_name.get(name) else {
            return Err(format!("unknown candidate '{name}' in ranking output"));
        };
        if !seen.insert(name) {
            return Err(format!("candidate '{name}' listed more than once"));
        }
        if candidate.match_score != screening_score {
            return Err(format!(
                "score mismatch for '{name}': ranking says {}, screening says {screening_score}",
                candidate.match_score
            ));
        }
        if let Some(prev) = previous_score {
            if candidate.match_score > prev {
                return Err(format!(
                    "ranking order violation at '{name}': {} after {prev}",
                    candidate.match_score
                ));
            }
        }
        previous_score = Some(candidate.match_score);
    }

    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn screened(name: &str, score: u32) -> ScreeningResult {
        ScreeningResult {
            candidate_name: name.to_string(),
            candidate_email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            candidate_phone: "+1 555".to_string(),
            match_score: score,
            recommendation: Recommendation::for_score(score),
            strengths: vec![
                "s1".to_string(),
                "s2".to_string(),
                "s3".to_string(),
                "s4".to_string(),
            ],
            overall_assessment: format!("{name} assessment"),
            ..Default::default()
        }
    }

    fn ranked(name: &str, score: u32, rank: u32) -> ShortlistedCandidate {
        ShortlistedCandidate {
            candidate_name: name.to_string(),
            match_score: score,
            rank,
            key_strengths: vec![],
            recommendation_reason: String::new(),
            interview_focus_areas: vec![],
            email: String::new(),
            phone: String::new(),
        }
    }

    // ── validate_ranking ────────────────────────────────────────────────────

    #[test]
    fn test_validate_accepts_consistent_ranking() {
        let a = screened("Alice Ray", 90);
        let b = screened("Bob Lin", 75);
        let screened_refs = vec![&a, &b];
        let ranking = vec![ranked("Alice Ray", 90, 1), ranked("Bob Lin", 75, 2)];
        assert!(validate_ranking(&ranking, &screened_refs).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_name() {
        let a = screened("Alice Ray", 90);
        let screened_refs = vec![&a];
        let ranking = vec![ranked("Nobody Known", 90, 1)];
        let err = validate_ranking(&ranking, &screened_refs).unwrap_err();
        assert!(err.contains("unknown candidate"));
    }

    #[test]
    fn test_validate_rejects_score_mismatch() {
        let a = screened("Alice Ray", 90);
        let screened_refs = vec![&a];
        let ranking = vec![ranked("Alice Ray", 95, 1)];
        let err = validate_ranking(&ranking, &screened_refs).unwrap_err();
        assert!(err.contains("score mismatch"));
    }

    #[test]
    fn test_validate_rejects_increasing_order() {
        let a = screened("Alice Ray", 90);
        let b = screened("Bob Lin", 75);
        let screened_refs = vec![&a, &b];
        let ranking = vec![ranked("Bob Lin", 75, 1), ranked("Alice Ray", 90, 2)];
        let err = validate_ranking(&ranking, &screened_refs).unwrap_err();
        assert!(err.contains("order violation"));
    }

    #[test]
    fn test_validate_rejects_duplicate_name() {
        let a = screened("Alice Ray", 90);
        let screened_refs = vec![&a];
        let ranking = vec![ranked("Alice Ray", 90, 1), ranked("Alice Ray", 90, 2)];
        let err = validate_ranking(&ranking, &screened_refs).unwrap_err();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn test_validate_allows_equal_scores() {
        let a = screened("Alice Ray", 80);
        let b = screened("Bob Lin", 80);
        let screened_refs = vec![&a, &b];
        let ranking = vec![ranked("Bob Lin", 80, 1), ranked("Alice Ray", 80, 2)];
        assert!(validate_ranking(&ranking, &screened_refs).is_ok());
    }

    #[test]
    fn test_validate_empty_ranking_is_ok() {
        let a = screened("Alice Ray", 90);
        let screened_refs = vec![&a];
        assert!(validate_ranking(&[], &screened_refs).is_ok());
    }

    // ── score_sort_shortlist ────────────────────────────────────────────────

    #[test]
    fn test_fallback_filters_below_min_score() {
        let results = vec![screened("Alice Ray", 90), screened("Bob Lin", 60)];
        let outcome = score_sort_shortlist(&results, 70, 10);
        assert_eq!(outcome.shortlisted.len(), 1);
        assert_eq!(outcome.shortlisted[0].candidate_name, "Alice Ray");
        assert_eq!(outcome.summary.total_candidates_reviewed, 2);
        assert_eq!(outcome.summary.total_shortlisted, 1);
    }

    #[test]
    fn test_fallback_sorts_descending_with_name_tiebreak() {
        let results = vec![
            screened("Zoe Park", 85),
            screened("Alice Ray", 85),
            screened("Bob Lin", 92),
        ];
        let outcome = score_sort_shortlist(&results, 70, 10);
        let names: Vec<&str> = outcome
            .shortlisted
            .iter()
            .map(|c| c.candidate_name.as_str())
            .collect();
        assert_eq!(names, vec!["Bob Lin", "Alice Ray", "Zoe Park"]);
    }

    #[test]
    fn test_fallback_ranks_are_contiguous() {
        let results = vec![
            screened("A A", 95),
            screened("B B", 90),
            screened("C C", 85),
        ];
        let outcome = score_sort_shortlist(&results, 70, 10);
        let ranks: Vec<u32> = outcome.shortlisted.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_fallback_truncates_to_limit() {
        let results: Vec<ScreeningResult> = (0..15)
            .map(|i| screened(&format!("Candidate {i:02}"), 80 + (i % 10) as u32))
            .collect();
        let outcome = score_sort_shortlist(&results, 70, 10);
        assert_eq!(outcome.shortlisted.len(), 10);
    }

    #[test]
    fn test_fallback_skips_error_results() {
        let results = vec![
            screened("Alice Ray", 90),
            ScreeningResult::error("Broken One".to_string(), "api down".to_string()),
        ];
        let outcome = score_sort_shortlist(&results, 70, 10);
        assert_eq!(outcome.shortlisted.len(), 1);
        assert_eq!(outcome.summary.total_candidates_reviewed, 2);
    }

    #[test]
    fn test_fallback_carries_contact_and_top3_strengths() {
        let results = vec![screened("Alice Ray", 90)];
        let outcome = score_sort_shortlist(&results, 70, 10);
        let top = &outcome.shortlisted[0];
        assert_eq!(top.email, "alice.ray@example.com");
        assert_eq!(top.key_strengths.len(), 3);
        assert_eq!(top.recommendation_reason, "Alice Ray assessment");
    }

    #[test]
    fn test_fallback_empty_input() {
        let outcome = score_sort_shortlist(&[], 70, 10);
        assert!(outcome.shortlisted.is_empty());
        assert_eq!(outcome.summary.overall_candidate_quality, "poor");
        assert_eq!(outcome.ranker_backend, "score_sort");
        assert!(!outcome.fallback_used);
    }

    #[test]
    fn test_quality_label_bands() {
        let excellent = vec![screened("A A", 95), screened("B B", 90)];
        let refs: Vec<&ScreeningResult> = excellent.iter().collect();
        assert_eq!(quality_label(&refs), "excellent");

        let fair = vec![screened("A A", 65)];
        let refs: Vec<&ScreeningResult> = fair.iter().collect();
        assert_eq!(quality_label(&refs), "fair");
    }

    #[test]
    fn test_top_skills_ranked_by_frequency() {
        let mut a = screened("A A", 90);
        a.skills_match.matched_skills = vec!["Rust".to_string(), "SQL".to_string()];
        let mut b = screened("B B", 85);
        b.skills_match.matched_skills = vec!["Rust".to_string()];
        let results = [&a, &b];
        let skills = top_skills(&results);
        assert_eq!(skills[0], "Rust");
        assert_eq!(skills[1], "SQL");
    }

    // ── ScoreSortRanker backend ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_score_sort_ranker_backend() {
        let ranker = ScoreSortRanker {
            min_score: 70,
            limit: 10,
        };
        let results = vec![screened("Alice Ray", 90)];
        let outcome = ranker.rank("Some JD", &results).await.unwrap();
        assert_eq!(outcome.ranker_backend, "score_sort");
        assert_eq!(outcome.shortlisted.len(), 1);
    }

    #[test]
    fn test_llm_ranking_response_parses_with_missing_summary() {
        let json = r#"{"shortlisted_candidates": [
            {"candidate_name": "Alice Ray", "match_score": 90, "rank": 1}
        ]}"#;
        let response: LlmRankingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.shortlisted_candidates.len(), 1);
        assert!(response.summary.is_none());
        assert!(response.shortlisted_candidates[0].key_strengths.is_empty());
    }
}
