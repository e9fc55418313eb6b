use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Owns a job's intermediate file and deletes it on every exit path.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Claims `path`, discarding anything a previous run left there so that a
    /// stale file cannot pass for fresh engine output.
    pub fn claim(path: &Path) -> Self {
        remove_if_present(path);
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        remove_if_present(&self.path);
    }
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed temp artifact"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove temp artifact: {}", e),
    }
}
