//! Data directory resolution.
//!
//! The document database lives under the platform data dir (`%APPDATA%` on
//! Windows, `~/.local/share` on Linux) unless an explicit directory is given
//! on the command line.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application name used for the data directory.
const APP_NAME: &str = "Mididash";

/// Resolve the data directory, honoring an explicit override.
pub fn data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir;
    }
    dirs::data_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Ensure the data directory exists and return the database path inside it.
pub fn ensure_db_path(data_dir: &Path) -> Result<PathBuf> {
    if !data_dir.exists() {
        debug!("Creating data directory: {}", data_dir.display());
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    }
    Ok(data_dir.join("db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = data_dir(Some(PathBuf::from("/tmp/custom")));
        assert_eq!(dir, PathBuf::from("/tmp/custom"));
    }

    #[test]
    fn test_ensure_db_path_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("nested").join("data");
        let db = ensure_db_path(&data).unwrap();
        assert!(data.exists());
        assert_eq!(db, data.join("db"));
    }
}
