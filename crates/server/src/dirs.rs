//! Platform-specific directories for the server's data and logs.

use std::path::PathBuf;

const APP_NAME: &str = "horde";

/// Log directory, `HORDE_LOG_DIR` or the platform cache dir.
///
/// - Linux: `~/.cache/horde/logs`
/// - macOS: `~/Library/Caches/horde/logs`
/// - Fallback: `/tmp/horde/logs`
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HORDE_LOG_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/horde"))
        .join("logs")
}

/// Data directory holding the cached world state, `HORDE_DATA_DIR` or the
/// platform data dir.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HORDE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}
