use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::instrument;

use crate::raw_pipeline::common::error::Result;
use crate::raw_pipeline::config::{EngineKind, RunConfiguration};
use crate::raw_pipeline::debayer::engine::{DebayEngine, ensure_artifact};
use crate::raw_pipeline::inputs::JobDescriptor;
use crate::raw_pipeline::process::{Invocation, ProcessRunner};

/// rawtherapee-cli with a pp3 profile, writing a 32-bit float TIFF.
pub struct RawTherapeeEngine {
    binary: PathBuf,
    profile: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl RawTherapeeEngine {
    pub fn new(binary: PathBuf, profile: PathBuf, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            binary,
            profile,
            runner,
        }
    }

    pub fn profile(&self) -> &Path {
        &self.profile
    }

    pub fn invocation(&self, job: &JobDescriptor, config: &RunConfiguration) -> Invocation {
        // Only the output directory is passed; the file is named after the
        // source stem, which is exactly the job's temp path.
        Invocation::new(self.name(), &self.binary, job.temp_path())
            .arg("-o")
            .arg(&config.cache_dir)
            .arg("-p")
            .arg(&self.profile)
            // 32-bit float, uncompressed TIFF, overwrite
            .args(["-b32", "-t", "-Y"])
            .arg("-c")
            .arg(job.source())
    }
}

impl DebayEngine for RawTherapeeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::RawTherapee
    }

    #[instrument(skip_all, fields(engine = "rawtherapee"))]
    fn debay(&self, job: &JobDescriptor, config: &RunConfiguration) -> Result<PathBuf> {
        ensure_artifact(self.runner.as_ref(), &self.invocation(job, config))
    }
}
