pub mod health;
pub mod notify;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::pipeline::handlers as pipeline_handlers;
use crate::state::AppState;
use crate::store::handlers as store_handlers;

pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);
    let public_dir = ServeDir::new(&state.config.public_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        // Job / candidate CRUD
        .route("/api/jobs", get(store_handlers::handle_list_jobs))
        .route("/api/jobs/:job_id", get(store_handlers::handle_get_job))
        .route(
            "/api/candidates/:job_id",
            get(store_handlers::handle_list_candidates),
        )
        .route(
            "/api/applications/:job_id",
            post(store_handlers::handle_submit_application),
        )
        // Shortlisting pipeline
        .route("/api/shortlist", post(pipeline_handlers::handle_shortlist))
        // Mock email notification
        .route("/api/notify", post(notify::handle_notify))
        // Frontend assets (served as-is, no templating)
        .nest_service("/static", static_dir)
        .nest_service("/public", public_dir)
        .with_state(state)
}
