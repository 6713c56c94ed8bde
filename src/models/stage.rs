//! Pipeline stage descriptors and run bookkeeping.

use std::path::PathBuf;

/// Static description of one pipeline stage.
///
/// A stage is an opaque unit of work: the notebook it executes and the
/// artifact it is expected to produce. The orchestrator never looks inside
/// either.
#[derive(Debug, Clone)]
pub struct StageDescriptor {
    /// Human-readable stage name
    pub name: String,

    /// Notebook executed for this stage
    pub notebook: PathBuf,

    /// Artifact (file or directory) the stage declares as output
    pub output: PathBuf,

    /// One-line description for listings
    pub description: String,
}

impl StageDescriptor {
    pub fn new(
        name: impl Into<String>,
        notebook: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            notebook: notebook.into(),
            output: output.into(),
            description: description.into(),
        }
    }
}

/// Lifecycle of a stage within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Outcome of a pipeline run over the requested stage range.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Stages that finished successfully
    pub completed: usize,

    /// Stages that failed
    pub failed: usize,

    /// Stages in the requested range
    pub requested: usize,

    /// Final status of each stage that was started, in execution order
    pub statuses: Vec<(String, StageStatus)>,
}

impl RunSummary {
    /// A run succeeds iff no stage in range failed.
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn record(&mut self, stage: &StageDescriptor, status: StageStatus) {
        self.statuses.push((stage.name.clone(), status));
    }
}
