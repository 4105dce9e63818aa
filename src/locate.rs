use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, Result};

/// Candidate locations for an input file, most specific first.
///
/// The configured path comes first. Each fallback name is then tried in the
/// working directory and finally one directory up, so the tool works whether
/// it is started next to the data or from a sub-directory.
pub fn candidates(configured: &Path, fallback_names: &[&str], base: &Path) -> Vec<PathBuf> {
    let mut out = vec![configured.to_path_buf()];
    if configured.is_relative() {
        out.push(base.join(configured));
    }
    for name in fallback_names {
        out.push(base.join(name));
    }
    for name in fallback_names {
        out.push(base.join("..").join(name));
    }
    out.dedup();
    out
}

/// First existing file among `candidates`, or `InputMissing` naming all of them.
pub fn first_existing(what: &'static str, candidates: Vec<PathBuf>) -> Result<PathBuf> {
    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => {
            debug!("[LOCATE] {what}: using {}", found.display());
            Ok(found.clone())
        }
        None => Err(AppError::InputMissing { what, candidates }),
    }
}

/// Resolve an input relative to the current directory.
pub fn locate(what: &'static str, configured: &Path, fallback_names: &[&str]) -> Result<PathBuf> {
    let base = std::env::current_dir()?;
    first_existing(what, candidates(configured, fallback_names, &base))
}
