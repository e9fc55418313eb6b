use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::raw_pipeline::common::error::{ConversionError, Result};
use crate::raw_pipeline::config::RunConfiguration;
use crate::raw_pipeline::debayer::probe_dimensions;
use crate::raw_pipeline::inputs::JobDescriptor;
use crate::raw_pipeline::process::{Invocation, ProcessRunner};

const TOOL: &str = "oiiotool";

/// Pixel type of the written EXR.
pub const OUTPUT_BIT_DEPTH: &str = "half";

/// Arguments for `oiiotool`, in evaluation order: load, resize, bit depth,
/// exposure, color matrix, compression, write.
pub fn build_normalize_args(temp: &Path, output: &Path, config: &RunConfiguration) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![temp.into()];

    if let Some(resize) = &config.resize {
        let flag = match &config.resize_filter {
            Some(filter) => format!("--resize:filter={filter}"),
            None => "--resize".to_string(),
        };
        args.push(flag.into());
        args.push(resize.as_oiio_arg().into());
    }

    args.push("-d".into());
    args.push(OUTPUT_BIT_DEPTH.into());

    args.push("--mulc".into());
    args.push(config.exposure.to_string().into());

    if let Some(matrix) = &config.matrix {
        // oiiotool treats the matrix as column vectors; ours is row-major.
        args.push("--ccmatrix:transpose=1".into());
        args.push(matrix.as_oiio_arg().into());
    }

    args.push("--compression".into());
    args.push(config.compression.as_oiio().into());

    args.push("-o".into());
    args.push(output.into());
    args
}

/// Runs the normalization command for one job at a time.
pub struct Normalizer {
    binary: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl Normalizer {
    pub fn new(binary: PathBuf, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { binary, runner }
    }

    pub fn invocation(&self, temp: &Path, job: &JobDescriptor, config: &RunConfiguration) -> Invocation {
        Invocation::new(TOOL, &self.binary, job.output_path())
            .args(build_normalize_args(temp, job.output_path(), config))
    }

    /// Writes `job.output_path()` from `temp`. Success follows the tool's exit status.
    #[instrument(skip_all, fields(output = %job.output_path().display()))]
    pub fn normalize(&self, temp: &Path, job: &JobDescriptor, config: &RunConfiguration) -> Result<()> {
        if let Some(resize) = &config.resize {
            match probe_dimensions(temp) {
                Ok((width, height)) => {
                    let (out_w, out_h) = resize.target_dimensions(width, height);
                    debug!("Resizing {}x{} -> {}x{}", width, height, out_w, out_h);
                }
                Err(e) => debug!("Could not probe intermediate size: {}", e),
            }
        }

        let output = self.runner.run(&self.invocation(temp, job, config))?;
        if let Some(message) = output.reported_error() {
            return Err(ConversionError::ToolReportedError { tool: TOOL, message });
        }
        Ok(())
    }
}
