use std::path::{Path, PathBuf};

use crate::raw_pipeline::common::error::{ConversionError, Result};

/// Binaries and profile checked during preflight.
#[derive(Debug, Clone)]
pub struct ResolvedTools {
    pub engine: PathBuf,
    pub oiiotool: PathBuf,
    pub profile: Option<PathBuf>,
}

/// Resolves a tool location.
///
/// A path with a directory component must point at an existing file; a bare
/// name is searched for on `PATH`.
pub fn resolve_binary(tool: &'static str, candidate: &Path) -> Result<PathBuf> {
    let not_found = || ConversionError::ToolNotFound {
        tool,
        path: candidate.to_path_buf(),
    };

    if candidate.components().count() > 1 || candidate.is_absolute() {
        return if candidate.is_file() {
            Ok(candidate.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    let search_path = std::env::var_os("PATH").ok_or_else(not_found)?;
    std::env::split_paths(&search_path)
        .flat_map(|dir| executable_names(candidate).map(move |name| dir.join(name)))
        .find(|path| path.is_file())
        .ok_or_else(not_found)
}

#[cfg(windows)]
fn executable_names(name: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    [name.to_path_buf(), name.with_extension("exe")].into_iter()
}

#[cfg(not(windows))]
fn executable_names(name: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    std::iter::once(name.to_path_buf())
}
