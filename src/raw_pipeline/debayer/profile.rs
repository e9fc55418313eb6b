//! Run-wide profile preparation
//!
//! With chromatic aberration correction requested, a copy of the pp3 profile
//! with `[RAW] CA=true` is written once per run and used by every job.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::raw_pipeline::common::error::Result;

const RAW_SECTION: &str = "[RAW]";
const CA_KEY: &str = "CA=";
const CA_ENABLED: &str = "CA=true";

/// A profile copy owned by the run. The file is deleted on drop.
#[derive(Debug)]
pub struct DerivedProfile {
    path: PathBuf,
}

impl DerivedProfile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DerivedProfile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Derived profile removed"),
            Err(e) => debug!(path = %self.path.display(), "Failed to remove derived profile: {}", e),
        }
    }
}

/// Writes `<cache_dir>/<stem>.ca.<ext>`, a copy of `original` with CA correction switched on.
pub fn derive_ca_profile(original: &Path, cache_dir: &Path) -> Result<DerivedProfile> {
    let contents = std::fs::read_to_string(original)?;

    let mut name: OsString = original
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("profile"));
    name.push(".ca.");
    name.push(original.extension().unwrap_or_else(|| "pp3".as_ref()));

    let path = cache_dir.join(name);
    std::fs::write(&path, enable_ca_correction(&contents))?;

    info!(
        profile = %original.display(),
        derived = %path.display(),
        "Chromatic aberration correction enabled"
    );
    Ok(DerivedProfile { path })
}

/// Sets `CA=true` in the `[RAW]` section, adding the key or the section when missing.
pub(crate) fn enable_ca_correction(contents: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_raw = false;
    let mut saw_raw = false;
    let mut ca_set = false;

    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            if in_raw && !ca_set {
                lines.push(CA_ENABLED);
                ca_set = true;
            }
            in_raw = trimmed == RAW_SECTION;
            saw_raw |= in_raw;
            lines.push(line);
            continue;
        }
        if in_raw && trimmed.starts_with(CA_KEY) {
            lines.push(CA_ENABLED);
            ca_set = true;
            continue;
        }
        lines.push(line);
    }

    if in_raw && !ca_set {
        lines.push(CA_ENABLED);
    }
    if !saw_raw {
        lines.push("");
        lines.push(RAW_SECTION);
        lines.push(CA_ENABLED);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
