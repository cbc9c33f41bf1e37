//! Input file discovery.
//!
//! Finds descriptor files and atlas images below a root directory by
//! extension. Results are sorted so every run processes files in the same
//! order.

use glob::{glob, Pattern};
use log::warn;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Error during input discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Invalid glob pattern
    InvalidPattern(String, glob::PatternError),
    /// Root directory missing or not a directory
    MissingRoot(PathBuf),
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::InvalidPattern(pattern, err) => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, err)
            }
            DiscoveryError::MissingRoot(path) => {
                write!(f, "Input directory not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Discover files below `base_dir` matching a glob pattern relative to it.
///
/// The base directory is escaped, so paths containing glob metacharacters
/// are matched literally.
pub fn discover_files(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let escaped = Pattern::escape(&base_dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped.trim_end_matches('/'), pattern);

    let paths =
        glob(&full_pattern).map_err(|e| DiscoveryError::InvalidPattern(pattern.to_string(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                // Log but continue on unreadable entries
                warn!("error reading path: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Discover every file below `base_dir` whose extension is one of `extensions`.
///
/// Extensions are given without the dot and matched case-sensitively.
/// The result is sorted and free of duplicates.
pub fn discover_by_extension(
    base_dir: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !base_dir.is_dir() {
        return Err(DiscoveryError::MissingRoot(base_dir.to_path_buf()));
    }

    let mut all_files = BTreeSet::new();
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        let files = discover_files(base_dir, &format!("**/*.{}", Pattern::escape(ext)))?;
        all_files.extend(files);
    }

    Ok(all_files.into_iter().collect())
}
