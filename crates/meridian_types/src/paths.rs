use std::path::{Path, PathBuf};
use std::sync::Once;

static CREATE_DIR_WARNED: Once = Once::new();

/// Resolve the Meridian home directory.
///
/// Priority:
/// 1) MERIDIAN_HOME
/// 2) ~/.meridian
/// 3) ./.meridian
pub fn meridian_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("MERIDIAN_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".meridian")
}

fn ensure_dir(dir: &Path) {
    if let Err(err) = std::fs::create_dir_all(dir) {
        CREATE_DIR_WARNED.call_once(|| {
            eprintln!(
                "Warning: failed to create Meridian directory {}: {}. Set MERIDIAN_HOME to a writable location.",
                dir.display(),
                err
            );
        });
    }
}

/// Config file path: ~/.meridian/config.toml. Not created.
pub fn config_path() -> PathBuf {
    meridian_home().join("config.toml")
}

/// Default logs directory: ~/.meridian/logs
pub fn default_logs_dir() -> PathBuf {
    let logs = meridian_home().join("logs");
    ensure_dir(&logs);
    logs
}
