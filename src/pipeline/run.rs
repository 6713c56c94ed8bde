// src/pipeline/run.rs

//! Sequential pipeline orchestrator.
//!
//! Runs the stage table strictly in declaration order, optionally restricted
//! to a contiguous 1-based sub-range. There is no parallelism and no retry:
//! a failed stage hands the continue/abort decision to the injected
//! [`FailurePolicy`].

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::{RunSummary, StageDescriptor, StageStatus};
use crate::utils::log;

/// Fixed per-stage execution timeout.
const STAGE_TIMEOUT: Duration = Duration::from_secs(600);

/// Minimum Python runtime required by the notebooks.
const MIN_PYTHON: (u64, u64) = (3, 12);

/// What to do after a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    Continue,
    Abort,
}

/// Run-level decision seam consulted when a stage fails.
pub trait FailurePolicy: Send + Sync {
    fn on_failure(&self, stage: &StageDescriptor) -> FailureDecision;
}

/// Always abort on the first failure.
pub struct AbortOnFailure;

impl FailurePolicy for AbortOnFailure {
    fn on_failure(&self, _stage: &StageDescriptor) -> FailureDecision {
        FailureDecision::Abort
    }
}

/// Always continue past failures.
pub struct ContinueOnFailure;

impl FailurePolicy for ContinueOnFailure {
    fn on_failure(&self, _stage: &StageDescriptor) -> FailureDecision {
        FailureDecision::Continue
    }
}

/// Ask the operator on stdin.
pub struct Interactive;

impl FailurePolicy for Interactive {
    fn on_failure(&self, stage: &StageDescriptor) -> FailureDecision {
        print!("\nStage '{}' failed. Continue to next stage? (y/n): ", stage.name);
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return FailureDecision::Abort;
        }
        if answer.trim().eq_ignore_ascii_case("y") {
            FailureDecision::Continue
        } else {
            FailureDecision::Abort
        }
    }
}

/// Execution seam for a single stage.
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run(&self, stage: &StageDescriptor) -> Result<()>;
}

/// Production runner: executes the stage notebook in place via
/// `jupyter nbconvert`, with a hard timeout.
pub struct NbConvertRunner {
    timeout: Duration,
}

impl NbConvertRunner {
    pub fn new() -> Self {
        Self {
            timeout: STAGE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for NbConvertRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StageRunner for NbConvertRunner {
    async fn run(&self, stage: &StageDescriptor) -> Result<()> {
        if !stage.notebook.exists() {
            return Err(AppError::stage(
                &stage.name,
                format!("notebook not found: {}", stage.notebook.display()),
            ));
        }

        let mut command = Command::new("jupyter");
        command
            .arg("nbconvert")
            .args(["--to", "notebook", "--execute", "--inplace"])
            .arg(format!(
                "--ExecutePreprocessor.timeout={}",
                self.timeout.as_secs()
            ))
            .arg(&stage.notebook);

        // Small grace on top of nbconvert's own timeout
        let deadline = self.timeout + Duration::from_secs(30);
        let output = match tokio::time::timeout(deadline, command.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::stage(
                    &stage.name,
                    format!("timed out after {}s", deadline.as_secs()),
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::stage(&stage.name, stderr.trim()));
        }

        Ok(())
    }
}

/// Verify the minimum Python runtime and the presence of jupyter.
///
/// Failure here aborts the run before any stage starts.
pub async fn check_prerequisites() -> Result<()> {
    log::info("Checking prerequisites...");

    let python = Command::new("python3")
        .arg("--version")
        .output()
        .await
        .map_err(|e| AppError::config(format!("python3 not found: {e}")))?;
    let version_line = String::from_utf8_lossy(&python.stdout).trim().to_string();

    match parse_python_version(&version_line) {
        Some((major, minor)) if (major, minor) >= MIN_PYTHON => {
            log::info(&format!("Python found: {version_line}"));
        }
        Some(_) => {
            return Err(AppError::config(format!(
                "Python {}.{}+ required, found {version_line}",
                MIN_PYTHON.0, MIN_PYTHON.1
            )));
        }
        None => {
            return Err(AppError::config(format!(
                "Could not parse Python version from '{version_line}'"
            )));
        }
    }

    let jupyter = Command::new("jupyter")
        .arg("--version")
        .output()
        .await
        .map_err(|e| AppError::config(format!("jupyter not found: {e}")))?;
    if !jupyter.status.success() {
        return Err(AppError::config("jupyter not found or not runnable"));
    }
    log::info("Jupyter found");

    Ok(())
}

/// Parse "Python X.Y.Z" into (X, Y).
fn parse_python_version(line: &str) -> Option<(u64, u64)> {
    let version = line.strip_prefix("Python")?.trim();
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Check whether a declared stage output exists; logged, non-blocking.
pub fn verify_output(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            log::sub_item(&format!(
                "Output verified: {} ({} bytes)",
                path.display(),
                meta.len()
            ));
            true
        }
        Ok(_) => {
            log::sub_item(&format!("Output verified: {} (directory)", path.display()));
            true
        }
        Err(_) => {
            log::warn(&format!("Output not found: {}", path.display()));
            false
        }
    }
}

/// Run the pipeline over a 1-based inclusive `[start, end]` sub-range.
///
/// `range = None` runs everything. Success means zero failures in range.
pub async fn run_pipeline(
    stages: &[StageDescriptor],
    range: Option<(usize, usize)>,
    runner: &dyn StageRunner,
    policy: &dyn FailurePolicy,
) -> Result<RunSummary> {
    let (start, end) = range.unwrap_or((1, stages.len()));
    if start < 1 || end > stages.len() || start > end {
        return Err(AppError::config(format!(
            "invalid stage range [{start}, {end}] for {} stages",
            stages.len()
        )));
    }

    log::header("PLACEMENT MAIL ANALYSIS - PIPELINE EXECUTION");
    log::info(&format!("Running stages {start} to {end} of {}", stages.len()));

    let mut summary = RunSummary {
        requested: end - start + 1,
        ..Default::default()
    };

    for (index, stage) in stages.iter().enumerate().take(end).skip(start - 1) {
        let number = index + 1;

        log::separator();
        log::step(number, stages.len(), &stage.name);
        log::sub_item(&stage.description);

        match runner.run(stage).await {
            Ok(()) => {
                summary.record(stage, StageStatus::Completed);
                log::success(&format!("Completed: {}", stage.name));
                verify_output(&stage.output);
                summary.completed += 1;
            }
            Err(e) => {
                summary.record(stage, StageStatus::Failed);
                log::error(&format!("Failed: {} ({e})", stage.name));
                summary.failed += 1;

                if policy.on_failure(stage) == FailureDecision::Abort {
                    log::info("Pipeline execution stopped by operator.");
                    break;
                }
            }
        }
    }

    log::summary(
        "PIPELINE EXECUTION",
        &[
            ("Completed", format!("{}/{}", summary.completed, summary.requested)),
            ("Failed", format!("{}/{}", summary.failed, summary.requested)),
        ],
    );

    Ok(summary)
}
