//! Log setup
//!
//! The terminal belongs to the dashboard, so logs go to `wxdash.log` in the
//! cache directory. Filtering follows `WXDASH_LOG` (e.g. `WXDASH_LOG=debug`),
//! defaulting to `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "WXDASH_LOG";

const LOG_FILE: &str = "wxdash.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber, appending to a log file under `dir`
///
/// Returns the log file path. Fails if the file can't be opened or a global
/// subscriber is already set.
pub fn init(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wxdash starting");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_log_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("logs");

        // Another test may already have installed a subscriber; the file is opened first either way
        let _ = init(&nested);

        assert!(nested.join(LOG_FILE).exists());
    }

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let _ = init(temp_dir.path());

        let err = init(temp_dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(!err.to_string().is_empty());
    }
}
