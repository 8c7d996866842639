use anyhow::{Context, Result};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
///
/// `ANTHROPIC_API_KEY` is optional: without it the CRUD surface still works
/// and the shortlisting pipeline responds 503.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub public_dir: PathBuf,
    pub anthropic_api_key: Option<String>,
    pub min_shortlist_score: u32,
    pub shortlist_limit: usize,
    pub ranker_backend: RankerBackend,
    pub port: u16,
    pub rust_log: String,
}

/// Which ranking backend to wire up at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankerBackend {
    /// LLM ranking with deterministic fallback (default).
    Llm,
    /// Pure sort-and-truncate, no ranking LLM call.
    ScoreSort,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let ranker_backend = match std::env::var("RANKER_BACKEND").as_deref() {
            Ok("score_sort") => RankerBackend::ScoreSort,
            _ => RankerBackend::Llm,
        };

        Ok(Config {
            data_dir: env_path("DATA_DIR", "data"),
            static_dir: env_path("STATIC_DIR", "static"),
            public_dir: env_path("PUBLIC_DIR", "public"),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            min_shortlist_score: std::env::var("MIN_SHORTLIST_SCORE")
                .unwrap_or_else(|_| "70".to_string())
                .parse::<u32>()
                .context("MIN_SHORTLIST_SCORE must be an integer 0-100")?,
            shortlist_limit: std::env::var("SHORTLIST_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<usize>()
                .context("SHORTLIST_LIMIT must be a positive integer")?,
            ranker_backend,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(std::env::var(key).unwrap_or_else(|_| default.to_string()))
}
