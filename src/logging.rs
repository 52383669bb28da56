//! Log setup
//!
//! The terminal belongs to the UI, so events go to a file under
//! `~/.dq-dash/` instead of stdout. The filter comes from `DQ_DASH_LOG`.

use crate::config::{create_private_dir, Config};
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DQ_DASH_LOG";
const DEFAULT_FILTER: &str = "dq_dash=info";

pub fn default_log_path() -> Option<PathBuf> {
    Config::config_dir().map(|dir| dir.join("dq-dash.log"))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn open_log(path: &PathBuf) -> Result<File> {
    if let Some(dir) = path.parent() {
        create_private_dir(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber writing to `path` (or the default log file).
///
/// Returns the file in use, or `None` when no location could be resolved.
pub fn init_logging(path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let Some(path) = path.or_else(default_log_path) else {
        return Ok(None);
    };
    let file = open_log(&path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    // A second call (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .try_init();

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_is_created_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dq-dash.log");
        let file = open_log(&path).unwrap();
        drop(file);
        assert!(path.exists());
    }

    #[test]
    fn test_init_returns_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let used = init_logging(Some(path.clone())).unwrap();
        assert_eq!(used, Some(path.clone()));
        tracing::info!("hello from test");
        assert!(path.exists());
    }
}
