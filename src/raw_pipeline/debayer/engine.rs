use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::raw_pipeline::common::error::{ConversionError, Result};
use crate::raw_pipeline::config::{EngineKind, RunConfiguration};
use crate::raw_pipeline::debayer::{DarktableEngine, DcrawEngine, RawTherapeeEngine};
use crate::raw_pipeline::inputs::JobDescriptor;
use crate::raw_pipeline::process::{Invocation, ProcessRunner};

/// A raw developer producing the job's intermediate image.
pub trait DebayEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    fn name(&self) -> &'static str {
        self.kind().tool_name()
    }

    /// Develops `job.source()` and returns the path of the intermediate it wrote.
    fn debay(&self, job: &JobDescriptor, config: &RunConfiguration) -> Result<PathBuf>;
}

/// Creates the engine for the run.
///
/// `profile` is the profile every job uses, already derived if the run needs it.
pub fn build_engine(
    kind: EngineKind,
    binary: PathBuf,
    profile: Option<PathBuf>,
    runner: Arc<dyn ProcessRunner>,
) -> Result<Box<dyn DebayEngine>> {
    let missing_profile = || {
        ConversionError::InvalidSetting(format!("{} requires a profile", kind.tool_name()))
    };

    let engine: Box<dyn DebayEngine> = match kind {
        EngineKind::Dcraw => Box::new(DcrawEngine::new(binary, runner)),
        EngineKind::RawTherapee => Box::new(RawTherapeeEngine::new(
            binary,
            profile.ok_or_else(missing_profile)?,
            runner,
        )),
        EngineKind::Darktable => Box::new(DarktableEngine::new(
            binary,
            profile.ok_or_else(missing_profile)?,
            runner,
        )),
    };
    Ok(engine)
}

/// Runs `invocation` and checks that it both stayed quiet and wrote its artifact.
///
/// A clean exit is not enough: some tools skip a file without complaining.
/// An empty artifact counts as missing, since a stdout redirect creates the
/// file before the tool has written anything.
pub fn ensure_artifact(runner: &dyn ProcessRunner, invocation: &Invocation) -> Result<PathBuf> {
    let output = runner.run(invocation)?;

    if let Some(message) = output.reported_error() {
        return Err(ConversionError::ToolReportedError {
            tool: invocation.tool,
            message,
        });
    }

    let written = std::fs::metadata(invocation.artifact())
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false);
    if !written {
        return Err(ConversionError::MissingArtifact {
            tool: invocation.tool,
            path: invocation.artifact().to_path_buf(),
        });
    }

    debug!(tool = invocation.tool, artifact = %invocation.artifact().display(), "Intermediate written");
    Ok(invocation.artifact().to_path_buf())
}
