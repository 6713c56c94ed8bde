//! Job search assistant web service.
//!
//! Serves the chat API over the prioritized jobs dataset produced by the
//! pipeline. Falls back to built-in sample postings when no dataset exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jobmail::{
    config,
    error::Result,
    models::JobPosting,
    services::{GeminiClient, JobSearchAgent},
    web::{AppState, build_router},
};

const BIND_ADDR: &str = "0.0.0.0:8000";

/// Initialize logging from RUST_LOG, defaulting to info.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}

/// Load the ranked dataset, trying the configured path first.
fn load_jobs(configured: &Path) -> Vec<JobPosting> {
    let candidates = [
        configured.to_path_buf(),
        PathBuf::from("artifacts/prioritized_jobs.json"),
    ];

    for path in &candidates {
        if path.exists() {
            match JobPosting::load_all(path) {
                Ok(jobs) => {
                    log::info!("Loaded {} job postings from {}", jobs.len(), path.display());
                    return jobs;
                }
                Err(e) => {
                    log::warn!("Failed to load jobs from {}: {}", path.display(), e);
                }
            }
        }
    }

    log::warn!("No prioritized jobs dataset found; serving sample postings");
    JobPosting::samples()
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_logging();

    let config_path = std::env::var("JOBMAIL_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let (config, _document) = config::load(Path::new(&config_path))?;

    let jobs = load_jobs(Path::new(&config.input_output.ranked_jobs));

    let client = GeminiClient::from_env()?;
    log::info!("Gemini client ready (model: {})", client.model());

    let agent = JobSearchAgent::new(jobs, Arc::new(client));
    let router = build_router(AppState::new(agent));

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    log::info!("Job search assistant listening on {}", BIND_ADDR);

    axum::serve(listener, router).await?;

    Ok(())
}
