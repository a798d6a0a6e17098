pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

/// Largest accepted request body. Resumes are small; anything bigger is junk.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Model diagnostics
        .route("/api/v1/model/health", get(analysis::handle_model_health))
        .route("/api/v1/model/test", post(analysis::handle_model_test))
        // Resume API
        .route(
            "/api/v1/resumes",
            post(resumes::handle_upload).get(resumes::handle_list),
        )
        .route("/api/v1/resumes/:id", get(resumes::handle_get))
        // Analysis API
        .route(
            "/api/v1/resumes/:id/analyses/ats",
            post(analysis::handle_analyze_ats),
        )
        .route(
            "/api/v1/resumes/:id/analyses/job-match",
            post(analysis::handle_match_job),
        )
        .route("/api/v1/stats", get(resumes::handle_stats))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
