use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::raw_pipeline::common::error::Result;
use crate::raw_pipeline::config::RunConfiguration;
use crate::raw_pipeline::debayer::{DerivedProfile, build_engine, derive_ca_profile};
use crate::raw_pipeline::inputs::{resolve_inputs, walk_root};
use crate::raw_pipeline::normalize::Normalizer;
use crate::raw_pipeline::process::{ProcessRunner, SystemRunner};
use crate::raw_pipeline::scheduler::{BatchReport, BatchScheduler};

#[cfg(test)]
mod tests;

/// Totals over every batch of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub batches: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl RunSummary {
    fn absorb(&mut self, report: &BatchReport) {
        self.batches += 1;
        self.converted += report.converted();
        self.skipped += report.skipped();
        self.failed += report.failed();
        self.failures.extend(
            report
                .failures()
                .map(|(source, error)| (source.to_path_buf(), error.to_string())),
        );
    }

    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed
    }
}

/// Entry point for a whole run: preflight, resolution, then one batch for the
/// explicitly named files and one per directory root.
pub struct Converter {
    config: RunConfiguration,
    runner: Arc<dyn ProcessRunner>,
}

impl Converter {
    pub fn new(config: RunConfiguration) -> Self {
        let runner = Arc::new(SystemRunner::with_timeout(config.timeout));
        Self { config, runner }
    }

    pub fn with_runner(config: RunConfiguration, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Converts everything under `inputs`.
    ///
    /// Returns an error only for configuration problems found before the first
    /// job starts; job failures end up in the summary.
    #[instrument(skip_all, fields(engine = %self.config.engine))]
    pub fn run(&self, inputs: &[PathBuf]) -> Result<RunSummary> {
        let tools = self.config.preflight()?;
        let resolved = resolve_inputs(inputs, &self.config)?;

        let derived = self.prepare_profile(tools.profile.as_deref())?;
        let profile = derived
            .as_ref()
            .map(|d| d.path().to_path_buf())
            .or(tools.profile);

        let engine = build_engine(self.config.engine, tools.engine, profile, self.runner.clone())?;
        let normalizer = Normalizer::new(tools.oiiotool, self.runner.clone());
        let scheduler = BatchScheduler::new(&self.config, engine, normalizer)?;

        let mut summary = RunSummary::default();

        if !resolved.files.is_empty() {
            summary.absorb(&scheduler.run_batch(&resolved.files));
        }

        for root in &resolved.roots {
            let jobs = walk_root(root, &self.config);
            if jobs.is_empty() {
                warn!(root = %root.display(), "No raw files found");
                continue;
            }
            info!(root = %root.display(), jobs = jobs.len(), "Converting directory");
            summary.absorb(&scheduler.run_batch(&jobs));
        }

        info!(
            converted = summary.converted,
            skipped = summary.skipped,
            failed = summary.failed,
            "Run complete"
        );
        Ok(summary)
    }

    // The derived copy lives for the whole run and is removed when dropped.
    fn prepare_profile(&self, profile: Option<&Path>) -> Result<Option<DerivedProfile>> {
        if !self.config.ca_correction {
            return Ok(None);
        }
        match profile {
            Some(profile) if self.config.engine.supports_ca_profile() => {
                derive_ca_profile(profile, &self.config.cache_dir).map(Some)
            }
            _ => {
                warn!(
                    engine = %self.config.engine,
                    "Chromatic aberration correction is not available for this engine, ignoring"
                );
                Ok(None)
            }
        }
    }
}
