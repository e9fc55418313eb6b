use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::raw_pipeline::common::error::{ConversionError, Result};
use crate::raw_pipeline::config::tools::{ResolvedTools, resolve_binary};
use crate::raw_pipeline::config::types::{ColorMatrix, EngineKind, ExrCompression, ResizeSpec};

pub const DEFAULT_EXPOSURE: f32 = 4.0;
pub const DEFAULT_WORKERS: usize = 2;

/// Directory holding the bundled default profiles, relative to the executable.
const PROFILE_DIR: &str = "profiles";
const DEFAULT_PROFILE_STEM: &str = "linear";
const CACHE_DIR_NAME: &str = "rawexr";

/// Filter names `oiiotool --resize:filter=` accepts.
const RESIZE_FILTERS: [&str; 15] = [
    "box",
    "triangle",
    "gaussian",
    "sharp-gaussian",
    "catmull-rom",
    "blackman-harris",
    "sinc",
    "lanczos3",
    "radial-lanczos3",
    "nuke-lanczos6",
    "mitchell",
    "bspline",
    "cubic",
    "keys",
    "simon",
];

/// Locations of the external binaries. Bare names are looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub dcraw: PathBuf,
    pub rawtherapee: PathBuf,
    pub darktable: PathBuf,
    pub oiiotool: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            dcraw: PathBuf::from("dcraw"),
            rawtherapee: PathBuf::from("rawtherapee-cli"),
            darktable: PathBuf::from("darktable-cli"),
            oiiotool: PathBuf::from("oiiotool"),
        }
    }
}

impl ToolPaths {
    pub fn engine_binary(&self, engine: EngineKind) -> &Path {
        match engine {
            EngineKind::Dcraw => &self.dcraw,
            EngineKind::RawTherapee => &self.rawtherapee,
            EngineKind::Darktable => &self.darktable,
        }
    }
}

/// Process-wide settings, built once at startup and shared read-only by every job.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub engine: EngineKind,
    pub tools: ToolPaths,
    /// Explicit profile; `None` selects the bundled default for the engine
    pub profile: Option<PathBuf>,
    pub ca_correction: bool,
    pub overwrite: bool,
    pub resize: Option<ResizeSpec>,
    pub resize_filter: Option<String>,
    pub exposure: f32,
    pub compression: ExrCompression,
    pub matrix: Option<ColorMatrix>,
    pub workers: usize,
    /// Include patterns, OR-matched anywhere in the candidate path
    pub filters: Vec<Regex>,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Per external invocation; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            tools: ToolPaths::default(),
            profile: None,
            ca_correction: false,
            overwrite: false,
            resize: None,
            resize_filter: None,
            exposure: DEFAULT_EXPOSURE,
            compression: ExrCompression::default(),
            matrix: None,
            workers: DEFAULT_WORKERS,
            filters: Vec::new(),
            cache_dir: std::env::temp_dir().join(CACHE_DIR_NAME),
            output_dir: PathBuf::from("."),
            timeout: None,
        }
    }
}

impl RunConfiguration {
    pub fn builder() -> RunConfigurationBuilder {
        RunConfigurationBuilder::default()
    }

    /// Profile the engine will be given, or `None` for engines without profiles.
    pub fn profile_path(&self) -> Option<PathBuf> {
        let extension = self.engine.profile_extension()?;
        Some(match &self.profile {
            Some(profile) => profile.clone(),
            None => default_profile_dir()
                .join(format!("{DEFAULT_PROFILE_STEM}.{extension}")),
        })
    }

    /// Startup checks against the filesystem: binaries, profile and working directories.
    ///
    /// Any error here is fatal for the run.
    pub fn preflight(&self) -> Result<ResolvedTools> {
        let engine = resolve_binary(
            self.engine.tool_name(),
            self.tools.engine_binary(self.engine),
        )?;
        let oiiotool = resolve_binary("oiiotool", &self.tools.oiiotool)?;

        let profile = match self.profile_path() {
            Some(profile) if !profile.is_file() => {
                return Err(ConversionError::ProfileNotFound(profile));
            }
            profile => profile,
        };

        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;

        debug!(
            engine = %engine.display(),
            oiiotool = %oiiotool.display(),
            "Resolved external tools"
        );

        Ok(ResolvedTools {
            engine,
            oiiotool,
            profile,
        })
    }
}

fn default_profile_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROFILE_DIR)
}

/// Builder for RunConfiguration
#[derive(Default)]
pub struct RunConfigurationBuilder {
    engine: Option<EngineKind>,
    tools: Option<ToolPaths>,
    profile: Option<PathBuf>,
    ca_correction: Option<bool>,
    overwrite: Option<bool>,
    resize: Option<String>,
    resize_filter: Option<String>,
    exposure: Option<f32>,
    compression: Option<ExrCompression>,
    matrix: Option<ColorMatrix>,
    workers: Option<usize>,
    include_patterns: Vec<String>,
    cache_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl RunConfigurationBuilder {
    pub fn engine(mut self, engine: EngineKind) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn profile(mut self, profile: impl Into<PathBuf>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn ca_correction(mut self, enable: bool) -> Self {
        self.ca_correction = Some(enable);
        self
    }

    pub fn overwrite(mut self, enable: bool) -> Self {
        self.overwrite = Some(enable);
        self
    }

    pub fn resize(mut self, spec: impl Into<String>) -> Self {
        self.resize = Some(spec.into());
        self
    }

    pub fn resize_filter(mut self, filter: impl Into<String>) -> Self {
        self.resize_filter = Some(filter.into());
        self
    }

    pub fn exposure(mut self, exposure: f32) -> Self {
        self.exposure = Some(exposure);
        self
    }

    pub fn compression(mut self, compression: ExrCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn matrix(mut self, matrix: ColorMatrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Adds include patterns. Each entry may itself be a comma separated list.
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in patterns {
            self.include_patterns.extend(
                entry
                    .as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            );
        }
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<RunConfiguration> {
        let default = RunConfiguration::default();

        let resize = self.resize.as_deref().map(str::parse::<ResizeSpec>).transpose()?;

        if let Some(filter) = &self.resize_filter {
            if !RESIZE_FILTERS.contains(&filter.as_str()) {
                return Err(ConversionError::InvalidSetting(format!(
                    "unknown resize filter '{filter}'"
                )));
            }
        }

        let exposure = self.exposure.unwrap_or(default.exposure);
        if !exposure.is_finite() || exposure <= 0.0 {
            return Err(ConversionError::InvalidSetting(format!(
                "exposure must be a positive number, got {exposure}"
            )));
        }

        let workers = self.workers.unwrap_or(default.workers);
        if workers == 0 {
            return Err(ConversionError::InvalidSetting(
                "worker count must be at least 1".to_string(),
            ));
        }

        let filters = self
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(RunConfiguration {
            engine: self.engine.unwrap_or(default.engine),
            tools: self.tools.unwrap_or(default.tools),
            profile: self.profile.or(default.profile),
            ca_correction: self.ca_correction.unwrap_or(default.ca_correction),
            overwrite: self.overwrite.unwrap_or(default.overwrite),
            resize,
            resize_filter: self.resize_filter,
            exposure,
            compression: self.compression.unwrap_or(default.compression),
            matrix: self.matrix.or(default.matrix),
            workers,
            filters,
            cache_dir: self.cache_dir.unwrap_or(default.cache_dir),
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            timeout: self.timeout.or(default.timeout),
        })
    }
}
