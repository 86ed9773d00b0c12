//! Configuration loading and worker pool setup

use std::path::Path;

use anyhow::{Context, Result};
use mqdq_core::MqdqConfig;

use crate::error::CliError;

/// Load the configuration file when given, else the defaults
pub fn load_config(path: Option<&Path>) -> Result<MqdqConfig> {
    let Some(path) = path else {
        return Ok(MqdqConfig::default());
    };
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.display().to_string()).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = MqdqConfig::from_toml_str(&text).map_err(CliError::from)?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the number of worker threads: the flag, else the configuration,
/// where 0 means one per core
pub fn worker_threads(flag: Option<usize>, config: &MqdqConfig) -> usize {
    match flag.unwrap_or(config.performance.worker_threads) {
        0 => num_cpus::get(),
        n => n,
    }
}

/// Size the global rayon pool. The pool can only be built once per
/// process; later calls keep the existing pool.
pub fn init_thread_pool(threads: usize) {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        Ok(()) => log::debug!("Worker pool with {threads} thread(s)"),
        Err(e) => log::debug!("Keeping existing worker pool: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.partition.max_rows, 50);
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mqdq.toml");
        std::fs::write(&path, "[output]\nmax_items_per_file = 7\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.output.max_items_per_file, 7);
    }

    #[test]
    fn test_missing_file() {
        let error = load_config(Some(Path::new("/nonexistent/mqdq.toml"))).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_thresholds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[partition]\nmin_rows = 80\nmax_rows = 40\n").unwrap();
        let error = load_config(Some(&path)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CliError>(),
            Some(CliError::ConfigError(_))
        ));
    }

    #[test]
    fn test_worker_threads() {
        let mut config = MqdqConfig::default();
        assert_eq!(worker_threads(Some(3), &config), 3);
        config.performance.worker_threads = 2;
        assert_eq!(worker_threads(None, &config), 2);
        config.performance.worker_threads = 0;
        assert_eq!(worker_threads(None, &config), num_cpus::get());
    }
}
