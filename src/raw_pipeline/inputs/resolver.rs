use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::raw_pipeline::common::error::{ConversionError, Result};
use crate::raw_pipeline::config::RunConfiguration;
use crate::raw_pipeline::inputs::extensions::is_raw_extension;
use crate::raw_pipeline::inputs::job::JobDescriptor;

/// Outcome of resolving the command line inputs.
#[derive(Debug, Default)]
pub struct ResolvedInputs {
    /// Directories to walk, each later converted as its own batch
    pub roots: Vec<PathBuf>,
    /// Jobs for files named directly, sorted by source path
    pub files: Vec<JobDescriptor>,
}

impl ResolvedInputs {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.files.is_empty()
    }
}

/// Collects jobs, applying the extension check, include filters and deduplication.
pub struct InputResolver<'a> {
    config: &'a RunConfiguration,
    seen: HashSet<PathBuf>,
    jobs: Vec<JobDescriptor>,
}

impl<'a> InputResolver<'a> {
    pub fn new(config: &'a RunConfiguration) -> Self {
        Self {
            config,
            seen: HashSet::new(),
            jobs: Vec::new(),
        }
    }

    /// Queues `path` if it is a recognized raw file passing the include filters.
    ///
    /// Returns whether a new job was added; duplicates are dropped silently.
    pub fn add_file(&mut self, path: &Path, root: Option<&Path>) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if !is_raw_extension(extension) {
            return false;
        }
        if !self.matches_filters(path) {
            debug!(path = %path.display(), "Excluded by include filters");
            return false;
        }
        if !self.seen.insert(path.to_path_buf()) {
            return false;
        }

        self.jobs.push(JobDescriptor::new(
            path.to_path_buf(),
            root.map(Path::to_path_buf),
            extension.to_string(),
            self.config,
        ));
        true
    }

    fn matches_filters(&self, path: &Path) -> bool {
        if self.config.filters.is_empty() {
            return true;
        }
        let haystack = path.to_string_lossy();
        self.config.filters.iter().any(|re| re.is_match(&haystack))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in lexicographic source order.
    pub fn into_jobs(self) -> Vec<JobDescriptor> {
        let mut jobs = self.jobs;
        jobs.sort_by(|a, b| a.source().cmp(b.source()));
        warn_on_temp_collisions(&jobs);
        jobs
    }
}

/// Splits user inputs into directory roots and directly named files.
///
/// Fails with [`ConversionError::NoInputs`] when nothing usable remains.
pub fn resolve_inputs(paths: &[PathBuf], config: &RunConfiguration) -> Result<ResolvedInputs> {
    let mut resolver = InputResolver::new(config);
    let mut roots: Vec<PathBuf> = Vec::new();

    for path in paths {
        let resolved = match std::fs::canonicalize(path) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(path = %path.display(), "Skipping input: {}", e);
                continue;
            }
        };

        if resolved.is_dir() {
            if !roots.contains(&resolved) {
                roots.push(resolved);
            }
        } else if !resolver.add_file(&resolved, None) {
            debug!(path = %resolved.display(), "Not a convertible raw file");
        }
    }

    let resolved = ResolvedInputs {
        roots,
        files: resolver.into_jobs(),
    };

    if resolved.is_empty() {
        return Err(ConversionError::NoInputs);
    }

    info!(
        files = resolved.files.len(),
        directories = resolved.roots.len(),
        "Inputs resolved"
    );
    Ok(resolved)
}

/// Recursively collects the jobs under one directory root.
///
/// Output paths mirror the subtree below `root`. Symlinks are followed, and a
/// link keeps its own name and location in the mirrored tree.
pub fn walk_root(root: &Path, config: &RunConfiguration) -> Vec<JobDescriptor> {
    let mut resolver = InputResolver::new(config);

    for entry in WalkDir::new(root).follow_links(true) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                resolver.add_file(entry.path(), Some(root));
            }
            Ok(_) => {}
            Err(e) => warn!(root = %root.display(), "Error while walking directory: {}", e),
        }
    }

    debug!(root = %root.display(), jobs = resolver.len(), "Directory walked");
    resolver.into_jobs()
}

// Temp names are derived from the source stem only, so two such jobs would
// overwrite each other's intermediate when they run at the same time.
fn warn_on_temp_collisions(jobs: &[JobDescriptor]) {
    let mut by_temp: HashMap<&Path, Vec<&Path>> = HashMap::new();
    for job in jobs {
        by_temp.entry(job.temp_path()).or_default().push(job.source());
    }
    for (temp, sources) in by_temp.into_iter().filter(|(_, s)| s.len() > 1) {
        warn!(
            temp = %temp.display(),
            count = sources.len(),
            "Sources share a temp file name and may clobber each other: {:?}",
            sources
        );
    }
}
