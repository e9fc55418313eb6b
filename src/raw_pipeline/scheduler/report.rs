use std::fmt;
use std::path::{Path, PathBuf};

use crate::raw_pipeline::common::error::ConversionError;
use crate::raw_pipeline::common::timing::StageTimings;

/// Lifecycle of a single job.
///
/// `Discovered → Queued → Debaying → (DebayFailed | DebaySucceeded) →
/// Normalizing → (NormalizeFailed | NormalizeSucceeded) → CleanedUp`, with
/// `Skipped` reachable straight from `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Discovered,
    Queued,
    Skipped,
    Debaying,
    DebayFailed,
    DebaySucceeded,
    Normalizing,
    NormalizeFailed,
    NormalizeSucceeded,
    CleanedUp,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    Converted,
    /// Output already present and overwriting is off
    Skipped,
    /// Output directory could not be prepared
    SetupFailed(ConversionError),
    DebayFailed(ConversionError),
    NormalizeFailed(ConversionError),
}

impl JobOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            JobOutcome::SetupFailed(_) | JobOutcome::DebayFailed(_) | JobOutcome::NormalizeFailed(_)
        )
    }

    pub fn error(&self) -> Option<&ConversionError> {
        match self {
            JobOutcome::SetupFailed(e) | JobOutcome::DebayFailed(e) | JobOutcome::NormalizeFailed(e) => Some(e),
            JobOutcome::Converted | JobOutcome::Skipped => None,
        }
    }
}

#[derive(Debug)]
pub struct JobReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub outcome: JobOutcome,
    pub timings: StageTimings,
}

/// Per-job reports of one batch, in dispatch order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Converted))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(JobOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ConversionError)> {
        self.jobs
            .iter()
            .filter_map(|r| r.outcome.error().map(|e| (r.source.as_path(), e)))
    }

    fn count(&self, predicate: impl Fn(&JobOutcome) -> bool) -> usize {
        self.jobs.iter().filter(|r| predicate(&r.outcome)).count()
    }
}
