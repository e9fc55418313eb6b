use std::path::Path;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, info, info_span, warn};

use crate::raw_pipeline::common::error::{ConversionError, Result};
use crate::raw_pipeline::common::timing::{StageTimings, Timer};
use crate::raw_pipeline::config::RunConfiguration;
use crate::raw_pipeline::debayer::DebayEngine;
use crate::raw_pipeline::inputs::JobDescriptor;
use crate::raw_pipeline::normalize::Normalizer;
use crate::raw_pipeline::scheduler::report::{BatchReport, JobOutcome, JobReport, JobState};
use crate::raw_pipeline::scheduler::temp::TempArtifact;

/// Runs batches of jobs on a pool of `config.workers` threads.
///
/// Each job holds its worker for its whole lifetime and blocks on the engine
/// and then the normalizer, so at most `workers` external processes run at once.
pub struct BatchScheduler<'a> {
    config: &'a RunConfiguration,
    engine: Box<dyn DebayEngine>,
    normalizer: Normalizer,
    pool: ThreadPool,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(
        config: &'a RunConfiguration,
        engine: Box<dyn DebayEngine>,
        normalizer: Normalizer,
    ) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("rawexr-worker-{i}"))
            .build()
            .map_err(|e| ConversionError::InvalidSetting(format!("worker pool: {e}")))?;

        Ok(Self {
            config,
            engine,
            normalizer,
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Converts `jobs` and returns one report per job, in the order given.
    ///
    /// Job failures are isolated: they are logged and reported, never propagated.
    pub fn run_batch(&self, jobs: &[JobDescriptor]) -> BatchReport {
        info!(
            jobs = jobs.len(),
            workers = self.workers(),
            engine = self.engine.name(),
            "Starting batch"
        );

        let reports: Vec<JobReport> = self
            .pool
            .install(|| jobs.par_iter().map(|job| self.process_job(job)).collect());

        let report = BatchReport { jobs: reports };
        info!(
            converted = report.converted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Batch finished"
        );
        report
    }

    fn process_job(&self, job: &JobDescriptor) -> JobReport {
        let span = info_span!("job", source = %job.source().display());
        let _enter = span.enter();

        transition(JobState::Discovered);
        let mut timings = StageTimings::new();
        let outcome = self.drive(job, &mut timings);

        match &outcome {
            JobOutcome::Converted => info!(
                output = %job.output_path().display(),
                "Converted in {}",
                timings.summary()
            ),
            JobOutcome::Skipped => info!(output = %job.output_path().display(), "Output exists, skipped"),
            JobOutcome::SetupFailed(e) => error!("Job setup failed: {}", e),
            JobOutcome::DebayFailed(e) => error!("Debayering failed: {}", e),
            JobOutcome::NormalizeFailed(e) => error!("Normalization failed: {}", e),
        }

        JobReport {
            source: job.source().to_path_buf(),
            output: job.output_path().to_path_buf(),
            outcome,
            timings,
        }
    }

    fn drive(&self, job: &JobDescriptor, timings: &mut StageTimings) -> JobOutcome {
        transition(JobState::Queued);

        // Several workers may race to create the same directory; create_dir_all tolerates that.
        if let Err(e) = std::fs::create_dir_all(job.output_dir()) {
            return JobOutcome::SetupFailed(e.into());
        }

        if !self.config.overwrite && job.output_path().exists() {
            transition(JobState::Skipped);
            return JobOutcome::Skipped;
        }

        let temp = TempArtifact::claim(job.temp_path());

        transition(JobState::Debaying);
        let timer = Timer::start("debay");
        let debayed = self.engine.debay(job, self.config);
        timings.record(timer.stop());

        let intermediate = match debayed {
            Ok(path) => path,
            Err(e) => {
                transition(JobState::DebayFailed);
                drop(temp);
                transition(JobState::CleanedUp);
                return JobOutcome::DebayFailed(e);
            }
        };
        transition(JobState::DebaySucceeded);

        transition(JobState::Normalizing);
        let timer = Timer::start("normalize");
        let normalized = self.normalizer.normalize(&intermediate, job, self.config);
        timings.record(timer.stop());

        let outcome = match normalized {
            Ok(()) => {
                transition(JobState::NormalizeSucceeded);
                JobOutcome::Converted
            }
            Err(e) => {
                transition(JobState::NormalizeFailed);
                discard_partial_output(job.output_path());
                JobOutcome::NormalizeFailed(e)
            }
        };

        drop(temp);
        transition(JobState::CleanedUp);
        outcome
    }
}

fn transition(state: JobState) {
    debug!(%state, "Job state");
}

// Whatever the normalizer left behind is not a valid output, and leaving it
// would make the next run skip the job.
fn discard_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => warn!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => error!(path = %path.display(), "Failed to remove partial output: {}", e),
    }
}
