// All LLM prompt constants for the shortlisting pipeline.
// Role fragments are combined with llm_client::prompts::JSON_ONLY_SYSTEM at call time.

/// System role for the intake stage.
pub const INTAKE_SYSTEM_ROLE: &str =
    "You are an expert HR analyst extracting structured requirements from job descriptions.";

/// Intake prompt template. Replace `{job_description}` before sending.
pub const INTAKE_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and extract key requirements.

Return a JSON object with this EXACT schema (no extra fields):
{
    "required_skills": ["skill1", "skill2"],
    "preferred_skills": ["skill1", "skill2"],
    "experience_required": "X years",
    "education_required": ["degree1", "degree2"],
    "key_responsibilities": ["responsibility1", "responsibility2"],
    "role_type": "job title/role",
    "technical_requirements": ["requirement1", "requirement2"],
    "soft_skills": ["skill1", "skill2"]
}

Be precise and extract only what is explicitly mentioned or strongly implied in the job description.

JOB DESCRIPTION:
{job_description}"#;

/// System role for the screening stage.
pub const SCREENING_SYSTEM_ROLE: &str =
    "You are an expert resume screener evaluating one candidate against job requirements.";

/// Screening prompt template.
/// Replace: {job_requirements}, {candidate_name}, {target_role}, {years_experience},
///          {education}, {skills}, {experience}, {certifications}, {resume_excerpt}
pub const SCREENING_PROMPT_TEMPLATE: &str = r#"Evaluate the following candidate against the job requirements.

Job Requirements:
{job_requirements}

Candidate Information:
Name: {candidate_name}
Target Role: {target_role}
Years of Experience: {years_experience}
Education: {education}
Skills: {skills}
Experience: {experience}
Certifications: {certifications}
{resume_excerpt}
Evaluate this candidate on a scale of 0-100 and provide detailed analysis.

Return a JSON object with this EXACT schema:
{
    "match_score": 85,
    "skills_match": {
        "matched_skills": ["skill1", "skill2"],
        "missing_skills": ["skill1", "skill2"],
        "match_percentage": 75
    },
    "experience_match": {
        "is_qualified": true,
        "years_gap": 0,
        "relevance_score": 90
    },
    "education_match": {
        "meets_requirements": true,
        "education_score": 85
    },
    "strengths": ["strength1", "strength2", "strength3"],
    "weaknesses": ["weakness1", "weakness2"],
    "overall_assessment": "Brief assessment of the candidate",
    "recommendation": "strong_match"
}

The recommendation field must be one of: strong_match, good_match, potential_match, not_recommended.
Keep it consistent with match_score: strong_match for 85+, good_match for 70-84,
potential_match for 50-69, not_recommended below 50."#;

/// Section header injected for `{resume_excerpt}` when a resume PDF was extracted.
pub const RESUME_EXCERPT_HEADER: &str = "Resume Extract (verbatim, may be truncated):";

/// System role for the ranking stage.
pub const RANKING_SYSTEM_ROLE: &str =
    "You are an expert hiring manager producing a final ranked shortlist from screening results.";

/// Ranking prompt template.
/// Replace: {job_description}, {screening_results}, {min_score}
pub const RANKING_PROMPT_TEMPLATE: &str = r#"Review the screening results and provide final recommendations.

Job Description:
{job_description}

Candidates Screening Results:
{screening_results}

Analyze all candidates and create a ranked shortlist. Return a JSON object with this EXACT schema:
{
    "shortlisted_candidates": [
        {
            "candidate_name": "Name",
            "match_score": 95,
            "rank": 1,
            "key_strengths": ["strength1", "strength2", "strength3"],
            "recommendation_reason": "Why this candidate is recommended",
            "interview_focus_areas": ["area1", "area2"]
        }
    ],
    "summary": {
        "total_candidates_reviewed": 5,
        "total_shortlisted": 3,
        "top_skills_found": ["skill1", "skill2"],
        "overall_candidate_quality": "excellent"
    }
}

HARD RULES:
1. Only include candidates with match_score >= {min_score}
2. Use each candidate's EXACT name and EXACT match_score from the screening results — never adjust scores
3. Rank candidates by match_score in descending order with rank starting at 1
4. overall_candidate_quality must be one of: excellent, good, fair, poor"#;
