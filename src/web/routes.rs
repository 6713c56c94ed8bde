//! HTTP handlers for the job search assistant.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::models::JobPosting;
use crate::web::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Defaults to a shared anonymous context when omitted
    #[serde(default = "default_user_id")]
    pub user_id: String,
    pub message: String,
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_jobs: usize,
    pub companies: usize,
    pub locations: usize,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, StatusCode> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let reply = state.agent.process_query(&request.user_id, message).await;
    Ok(Json(json!({
        "status": reply.status,
        "response": reply.response,
        "intent": reply.intent,
        "jobs": reply.jobs,
        "timestamp": reply.timestamp,
    })))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Json<Value> {
    let limit = query.limit.unwrap_or(10);
    let jobs: Vec<&JobPosting> = state.agent.jobs().iter().take(limit).collect();
    Json(json!({
        "status": "success",
        "count": jobs.len(),
        "jobs": jobs,
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let jobs = state.agent.jobs();
    let companies: BTreeSet<&str> = jobs.iter().map(|j| j.company_name.as_str()).collect();
    let locations: BTreeSet<&str> = jobs
        .iter()
        .map(|j| j.location_city.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    Json(StatsResponse {
        total_jobs: jobs.len(),
        companies: companies.len(),
        locations: locations.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::util::ServiceExt;

    use super::*;
    use crate::error::Result;
    use crate::services::{JobSearchAgent, TextGenerator};
    use crate::web::app::{AppState, build_router};

    struct EchoGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
            Ok("stubbed answer".to_string())
        }
    }

    fn test_router() -> axum::Router {
        let agent = JobSearchAgent::new(JobPosting::samples(), Arc::new(EchoGenerator));
        build_router(AppState::new(agent))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn chat_returns_generated_answer_and_matches() {
        let request = Request::post("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"user_id": "u1", "message": "python jobs in Bangalore"}"#,
            ))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["response"], "stubbed answer");
        assert_eq!(body["intent"], "job_search");
        assert!(body["jobs"].as_array().is_some_and(|j| !j.is_empty()));
    }

    #[tokio::test]
    async fn chat_rejects_blank_messages() {
        let request = Request::post("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message": "   "}"#))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn jobs_endpoint_honors_limit() {
        let response = test_router()
            .oneshot(Request::get("/api/jobs?limit=2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["jobs"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stats_counts_distinct_companies_and_locations() {
        let response = test_router()
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["total_jobs"], 5);
        assert_eq!(body["companies"], 5);
        // Two sample postings share Bangalore
        assert_eq!(body["locations"], 4);
    }
}
