//! Pipeline orchestration.
//!
//! - `stages`: the static stage table
//! - `run`: prerequisite checks and the sequential orchestrator

pub mod run;
pub mod stages;

pub use run::{
    AbortOnFailure, ContinueOnFailure, FailureDecision, FailurePolicy, Interactive,
    NbConvertRunner, StageRunner, check_prerequisites, run_pipeline, verify_output,
};
pub use stages::stages;
