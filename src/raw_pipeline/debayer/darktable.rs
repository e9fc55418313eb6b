use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, instrument};

use crate::raw_pipeline::common::error::Result;
use crate::raw_pipeline::config::{EngineKind, RunConfiguration};
use crate::raw_pipeline::debayer::engine::{DebayEngine, ensure_artifact};
use crate::raw_pipeline::inputs::JobDescriptor;
use crate::raw_pipeline::process::{Invocation, ProcessRunner};

/// darktable-cli with an xmp sidecar, exporting a float PFM.
///
/// darktable holds a lock on its library and config directory, which would
/// serialize (or fail) concurrent exports. Each invocation therefore runs with
/// an in-memory library, custom presets disabled and a private config directory.
pub struct DarktableEngine {
    binary: PathBuf,
    profile: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    next_session: AtomicU64,
}

impl DarktableEngine {
    pub fn new(binary: PathBuf, profile: PathBuf, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            binary,
            profile,
            runner,
            next_session: AtomicU64::new(0),
        }
    }

    pub fn profile(&self) -> &Path {
        &self.profile
    }

    pub fn invocation(&self, job: &JobDescriptor, config_dir: &Path) -> Invocation {
        Invocation::new(self.name(), &self.binary, job.temp_path())
            .arg(job.source())
            .arg(&self.profile)
            .arg(job.temp_path())
            .args(["--apply-custom-presets", "false"])
            .args(["--core", "--library", ":memory:"])
            .arg("--configdir")
            .arg(config_dir)
    }

    fn session_dir(&self, job: &JobDescriptor, config: &RunConfiguration) -> PathBuf {
        let session = self.next_session.fetch_add(1, Ordering::Relaxed);
        let mut name = std::ffi::OsString::from(format!(".darktable-{}-{}-", std::process::id(), session));
        name.push(job.stem());
        config.cache_dir.join(name)
    }
}

impl DebayEngine for DarktableEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Darktable
    }

    #[instrument(skip_all, fields(engine = "darktable"))]
    fn debay(&self, job: &JobDescriptor, config: &RunConfiguration) -> Result<PathBuf> {
        let session = SessionDir::create(self.session_dir(job, config))?;
        ensure_artifact(self.runner.as_ref(), &self.invocation(job, session.path()))
    }
}

/// Private darktable config directory, removed when the export is done.
struct SessionDir(PathBuf);

impl SessionDir {
    fn create(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for SessionDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            debug!(path = %self.0.display(), "Failed to remove darktable session dir: {}", e);
        }
    }
}
