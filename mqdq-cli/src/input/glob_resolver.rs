//! File pattern resolution using glob

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Resolve file patterns to actual file paths
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths = glob(pattern).map_err(|_| CliError::InvalidPattern(pattern.clone()))?;

        for path_result in paths {
            let path =
                path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;

            if path.is_file() {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!("No files found matching the provided patterns");
    }

    // Remove duplicates and sort
    files.sort();
    files.dedup();

    Ok(files)
}

/// Find the JSON dumps of a document in a directory: `<stem>_*.json`,
/// sorted by name
pub fn find_dumps(dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CliError::FileNotFound(dir.display().to_string()).into());
    }
    let pattern = format!(
        "{}/{}_*.json",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(stem)
    );
    let mut dumps = Vec::new();
    for path in glob(&pattern).map_err(|_| CliError::InvalidPattern(pattern.clone()))? {
        dumps.push(path.with_context(|| format!("Error resolving pattern: {pattern}"))?);
    }
    dumps.sort();
    Ok(dumps)
}
