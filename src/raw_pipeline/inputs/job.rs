use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::raw_pipeline::config::RunConfiguration;

pub const OUTPUT_EXTENSION: &str = "exr";

/// Everything one conversion needs to know about its source file.
///
/// Built once by the resolver and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    source: PathBuf,
    root: Option<PathBuf>,
    extension: String,
    relative_dir: PathBuf,
    output_path: PathBuf,
    temp_path: PathBuf,
}

impl JobDescriptor {
    /// `root` is the walked directory the source was found under, `None` for
    /// files given explicitly.
    pub fn new(
        source: PathBuf,
        root: Option<PathBuf>,
        extension: String,
        config: &RunConfiguration,
    ) -> Self {
        let relative_dir = root
            .as_deref()
            .and_then(|root| source.parent()?.strip_prefix(root).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let stem = source
            .file_stem()
            .unwrap_or_else(|| OsStr::new("image"))
            .to_os_string();

        let output_path = config
            .output_dir
            .join(&relative_dir)
            .join(with_extension(&stem, OUTPUT_EXTENSION));

        // Basename only: sources sharing a stem share a temp path.
        let temp_path = config
            .cache_dir
            .join(with_extension(&stem, config.engine.intermediate_extension()));

        Self {
            source,
            root,
            extension,
            relative_dir,
            output_path,
            temp_path,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn relative_dir(&self) -> &Path {
        &self.relative_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn output_dir(&self) -> &Path {
        self.output_path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn stem(&self) -> &OsStr {
        self.source.file_stem().unwrap_or_else(|| OsStr::new("image"))
    }
}

// `Path::with_extension` would eat a dotted stem such as `pano.001`.
fn with_extension(stem: &OsStr, extension: &str) -> OsString {
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    name
}
