//! Router construction and shared state.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::services::JobSearchAgent;
use crate::web::routes;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<JobSearchAgent>,
}

impl AppState {
    pub fn new(agent: JobSearchAgent) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/chat", post(routes::chat))
        .route("/api/jobs", get(routes::list_jobs))
        .route("/api/stats", get(routes::stats))
        .with_state(state)
}
