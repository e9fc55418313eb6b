use std::path::PathBuf;
use std::sync::Arc;

use tracing::instrument;

use crate::raw_pipeline::common::error::Result;
use crate::raw_pipeline::config::{EngineKind, RunConfiguration};
use crate::raw_pipeline::debayer::engine::{DebayEngine, ensure_artifact};
use crate::raw_pipeline::inputs::JobDescriptor;
use crate::raw_pipeline::process::{Invocation, ProcessRunner};

/// `-T` TIFF, `-4` linear 16-bit, `-w` camera white balance, `-q 3` AHD, `-o 1` sRGB primaries.
const DCRAW_ARGS: [&str; 7] = ["-T", "-4", "-w", "-q", "3", "-o", "1"];

/// dcraw / dcraw_emu: fast native decoder, streams a TIFF to stdout.
pub struct DcrawEngine {
    binary: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl DcrawEngine {
    pub fn new(binary: PathBuf, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { binary, runner }
    }

    pub fn invocation(&self, job: &JobDescriptor) -> Invocation {
        Invocation::new(self.name(), &self.binary, job.temp_path())
            .args(DCRAW_ARGS)
            .arg("-c")
            .arg(job.source())
            .stdout_to(job.temp_path())
    }
}

impl DebayEngine for DcrawEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Dcraw
    }

    #[instrument(skip_all, fields(engine = "dcraw"))]
    fn debay(&self, job: &JobDescriptor, _config: &RunConfiguration) -> Result<PathBuf> {
        ensure_artifact(self.runner.as_ref(), &self.invocation(job))
    }
}
