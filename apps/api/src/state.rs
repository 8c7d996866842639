use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pipeline::ranking::Ranker;
use crate::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    /// `None` when ANTHROPIC_API_KEY is unset — shortlisting responds 503.
    pub llm: Option<LlmClient>,
    pub config: Config,
    /// Pluggable ranker. Default: LlmRanker. Swap via RANKER_BACKEND env.
    pub ranker: Arc<dyn Ranker>,
}
