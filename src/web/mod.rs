//! HTTP service exposing the job search assistant.

pub mod app;
pub mod routes;

pub use app::{AppState, build_router};
