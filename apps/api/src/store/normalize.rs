//! Legacy candidate JSON normalization.
//!
//! Early application data stored skills as nested category objects and
//! omitted fields the screener relies on. Everything read from disk is
//! normalized into the flat `CandidateApplication` shape before use.

use serde_json::{json, Map, Value};

const FLAT_SKILL_KEYS: &[&str] = &[
    "programming",
    "frameworks",
    "tools",
    "cloud",
    "databases",
    "testing",
];

/// Structural issues found in a raw candidate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureReport {
    pub issues: Vec<String>,
}

impl StructureReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Checks a raw candidate document against the standardized interface.
pub fn validate_structure(data: &Value) -> StructureReport {
    let mut issues = Vec::new();

    if data.get("personalInfo").and_then(Value::as_object).is_none() {
        issues.push("Missing personalInfo".to_string());
    }
    for key in ["education", "experience"] {
        match data.get(key).and_then(Value::as_array) {
            Some(arr) if !arr.is_empty() => {}
            _ => issues.push(format!("Missing or empty {key} array")),
        }
    }
    match data.get("skills") {
        Some(skills) => {
            for key in FLAT_SKILL_KEYS {
                if skills.get(key).and_then(Value::as_array).is_none() {
                    issues.push(format!("skills.{key} must be an array"));
                }
            }
        }
        None => issues.push("Missing skills".to_string()),
    }
    if data.get("targetRole").and_then(Value::as_str).is_none() {
        issues.push("Missing targetRole".to_string());
    }
    if data.get("applicationDate").and_then(Value::as_str).is_none() {
        issues.push("Missing applicationDate".to_string());
    }
    if data.get("yearsOfExperience").and_then(Value::as_u64).is_none() {
        issues.push("Missing or invalid yearsOfExperience".to_string());
    }

    StructureReport { issues }
}

/// Rewrites a raw candidate document into the standardized shape,
/// backfilling defaults and flattening legacy skill structures.
pub fn normalize_candidate(data: &Value) -> Value {
    let personal = data.get("personalInfo").cloned().unwrap_or(json!({}));
    let location = personal.get("location").cloned().unwrap_or(json!({}));

    let mut normalized = json!({
        "personalInfo": {
            "firstName": str_or_empty(&personal, "firstName"),
            "lastName": str_or_empty(&personal, "lastName"),
            "email": str_or_empty(&personal, "email"),
            "phone": str_or_empty(&personal, "phone"),
            "location": {
                "city": str_or_empty(&location, "city"),
                "state": str_or_empty(&location, "state"),
                "country": str_or_empty(&location, "country"),
            },
            "dateOfBirth": str_or_empty(&personal, "dateOfBirth"),
            "linkedin": str_or_empty(&personal, "linkedin"),
            "github": str_or_empty(&personal, "github"),
        },
        "education": array_or_empty(data, "education"),
        "experience": array_or_empty(data, "experience"),
        "skills": flatten_skills(data.get("skills")),
        "certifications": array_or_empty(data, "certifications"),
        "targetRole": str_or_empty(data, "targetRole"),
        "applicationDate": str_or_empty(data, "applicationDate"),
        "status": data
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("pending"),
        "yearsOfExperience": data
            .get("yearsOfExperience")
            .and_then(Value::as_u64)
            .unwrap_or(0),
    });

    // Optional fields survive only when present.
    if let Some(portfolio) = personal.get("portfolio").and_then(Value::as_str) {
        normalized["personalInfo"]["portfolio"] = json!(portfolio);
    }
    if let Some(projects) = data.get("projects").and_then(Value::as_array) {
        normalized["projects"] = json!(projects);
    }

    normalized
}

/// Flattens any legacy skills shape into the six flat category arrays.
///
/// Already-flat documents pass through unchanged (minus duplicates).
/// Nested category objects are folded into `cloud`, `programming`, or
/// `tools` depending on the parent key.
pub fn flatten_skills(skills: Option<&Value>) -> Value {
    let mut flat: Map<String, Value> = FLAT_SKILL_KEYS
        .iter()
        .map(|k| (k.to_string(), json!([])))
        .collect();

    let Some(Value::Object(categories)) = skills else {
        return Value::Object(flat);
    };

    if categories
        .get("programming")
        .map(Value::is_array)
        .unwrap_or(false)
    {
        for key in FLAT_SKILL_KEYS {
            if let Some(arr) = categories.get(*key).and_then(Value::as_array) {
                flat.insert(key.to_string(), json!(clean_list(arr)));
            }
        }
        return Value::Object(flat);
    }

    for (category, value) in categories {
        let bucket = bucket_for_category(category);
        match value {
            Value::Array(items) => push_all(&mut flat, bucket, items),
            Value::Object(nested) => {
                for inner in nested.values() {
                    if let Value::Array(items) = inner {
                        push_all(&mut flat, bucket, items);
                    }
                }
            }
            _ => {}
        }
    }

    for key in FLAT_SKILL_KEYS {
        let arr = flat[*key].as_array().cloned().unwrap_or_default();
        flat.insert(key.to_string(), json!(clean_list(&arr)));
    }

    Value::Object(flat)
}

fn bucket_for_category(category: &str) -> &'static str {
    if category.contains("cloud") || category == "iac" || category == "containers" {
        "cloud"
    } else if category == "scripting" {
        "programming"
    } else {
        "tools"
    }
}

fn push_all(flat: &mut Map<String, Value>, bucket: &str, items: &[Value]) {
    if let Some(Value::Array(target)) = flat.get_mut(bucket) {
        target.extend(items.iter().cloned());
    }
}

/// Dedups and drops non-string / blank entries, preserving first-seen order.
fn clean_list(items: &[Value]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(String::from)
        .collect()
}

fn str_or_empty(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn array_or_empty(value: &Value, key: &str) -> Value {
    value
        .get(key)
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or(json!([]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::CandidateApplication;

    #[test]
    fn test_flatten_skills_passes_flat_shape_through() {
        let skills = json!({
            "programming": ["Rust", "Python", "Rust"],
            "frameworks": ["axum"],
            "tools": ["git", " "],
        });
        let flat = flatten_skills(Some(&skills));
        assert_eq!(flat["programming"], json!(["Rust", "Python"]));
        assert_eq!(flat["frameworks"], json!(["axum"]));
        assert_eq!(flat["tools"], json!(["git"]));
        assert_eq!(flat["databases"], json!([]));
    }

    #[test]
    fn test_flatten_skills_folds_nested_categories() {
        let skills = json!({
            "cloudPlatforms": ["AWS", "GCP"],
            "scripting": ["Bash"],
            "cicd": ["Jenkins"],
            "monitoring": {"metrics": ["Prometheus"], "logs": ["Loki"]},
        });
        let flat = flatten_skills(Some(&skills));
        assert_eq!(flat["cloud"], json!(["AWS", "GCP"]));
        assert_eq!(flat["programming"], json!(["Bash"]));
        // serde_json maps iterate in key order: cicd, then monitoring.logs, monitoring.metrics
        assert_eq!(flat["tools"], json!(["Jenkins", "Loki", "Prometheus"]));
    }

    #[test]
    fn test_flatten_skills_missing_yields_empty_arrays() {
        let flat = flatten_skills(None);
        for key in FLAT_SKILL_KEYS {
            assert_eq!(flat[*key], json!([]));
        }
    }

    #[test]
    fn test_validate_structure_reports_all_gaps() {
        let report = validate_structure(&json!({}));
        assert!(!report.is_valid());
        assert!(report.issues.iter().any(|i| i.contains("personalInfo")));
        assert!(report.issues.iter().any(|i| i.contains("targetRole")));
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("yearsOfExperience")));
    }

    #[test]
    fn test_validate_structure_accepts_standard_document() {
        let data = normalize_candidate(&json!({
            "personalInfo": {"firstName": "A", "lastName": "B"},
            "education": [{"degree": "BSc"}],
            "experience": [{"title": "Engineer"}],
            "skills": {"programming": ["Rust"]},
            "targetRole": "Backend Engineer",
            "applicationDate": "2025-02-01",
            "yearsOfExperience": 4
        }));
        let report = validate_structure(&data);
        assert!(report.is_valid(), "issues: {:?}", report.issues);
    }

    #[test]
    fn test_normalize_candidate_backfills_defaults() {
        let data = json!({
            "personalInfo": {"firstName": "Grace"},
            "targetRole": "SRE"
        });
        let normalized = normalize_candidate(&data);
        assert_eq!(normalized["status"], "pending");
        assert_eq!(normalized["yearsOfExperience"], 0);
        assert_eq!(normalized["personalInfo"]["lastName"], "");
        assert_eq!(normalized["education"], json!([]));
        assert!(normalized.get("projects").is_none());
    }

    #[test]
    fn test_normalize_candidate_preserves_optional_fields() {
        let data = json!({
            "personalInfo": {"firstName": "A", "portfolio": "https://a.dev"},
            "projects": ["ray tracer"]
        });
        let normalized = normalize_candidate(&data);
        assert_eq!(normalized["personalInfo"]["portfolio"], "https://a.dev");
        assert_eq!(normalized["projects"], json!(["ray tracer"]));
    }

    #[test]
    fn test_normalized_document_deserializes_into_model() {
        let legacy = json!({
            "personalInfo": {"firstName": "Old", "lastName": "Format"},
            "skills": {"cloudPlatforms": ["AWS"], "scripting": ["Bash"]},
            "targetRole": "DevOps Engineer",
            "yearsOfExperience": 6
        });
        let normalized = normalize_candidate(&legacy);
        let candidate: CandidateApplication = serde_json::from_value(normalized).unwrap();
        assert_eq!(candidate.skills.cloud, vec!["AWS"]);
        assert_eq!(candidate.skills.programming, vec!["Bash"]);
        assert_eq!(candidate.years_of_experience, 6);
    }
}
