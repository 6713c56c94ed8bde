// src/models/mod.rs

//! Domain models for the pipeline application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod chat;
mod config;
mod job;
mod stage;

// Re-export all public types
pub use chat::{ChatTurn, QueryIntent, UserContext};
pub use config::{
    Config, DatePattern, DeadlineParsing, ExperienceParsing, ExperienceThresholds,
    ExperienceTypes, IncrementalConfig, IoConfig, LoggingConfig, NormalizationConfig,
    PositionLevels, ProcessingConfig, SalaryParsing, SalaryPattern, ScoringWeights,
    WorkModeKeywords,
};
pub use job::JobPosting;
pub use stage::{RunSummary, StageDescriptor, StageStatus};
