mod config;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, RankerBackend};
use crate::llm_client::LlmClient;
use crate::pipeline::ranking::{LlmRanker, Ranker, ScoreSortRanker};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::JobStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("hireline_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hireline API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the file-system store
    let store = JobStore::new(config.data_dir.clone());
    store.ensure_root().await?;
    info!("Job store rooted at {}", config.data_dir.display());

    // Initialize LLM client — optional, the CRUD surface works without it
    let llm = match config.anthropic_api_key.clone() {
        Some(key) => {
            let client = LlmClient::new(key);
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set — shortlisting pipeline disabled");
            None
        }
    };

    // Initialize ranker (LlmRanker by default — swap via RANKER_BACKEND)
    let ranker: Arc<dyn Ranker> = match (&llm, config.ranker_backend) {
        (Some(client), RankerBackend::Llm) => Arc::new(LlmRanker {
            llm: client.clone(),
            min_score: config.min_shortlist_score,
            limit: config.shortlist_limit,
        }),
        _ => Arc::new(ScoreSortRanker {
            min_score: config.min_shortlist_score,
            limit: config.shortlist_limit,
        }),
    };

    // Build app state
    let state = AppState {
        store,
        llm,
        config: config.clone(),
        ranker,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
