use std::path::{Path, PathBuf};

/// Get the base data directory following the XDG Base Directory Specification.
/// Returns `$XDG_DATA_HOME/lifedeck`, falling back to the platform data dir
/// (`~/.local/share/lifedeck` on Linux).
pub fn get_data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data).join("lifedeck");
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lifedeck")
}

/// Get the logs directory path.
/// Returns `{data_dir}/logs`.
pub fn get_log_dir() -> PathBuf {
    get_data_dir().join("logs")
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
