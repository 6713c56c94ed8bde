// src/lib.rs

//! jobmail: Placement Mail Analysis Pipeline

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod state;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;
