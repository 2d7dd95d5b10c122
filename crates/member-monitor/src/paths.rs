//! Locations of the monitor's files.
//!
//! Everything lives under one state directory:
//!
//! ```text
//! ~/.member-monitor/
//! ├── .env                  # Optional gateway credentials
//! └── member_monitor.json   # Persisted monitor configuration
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use monitor_persistence::CONFIG_FILE_NAME;

/// Environment variable for a custom state directory.
pub const STATE_DIR_ENV: &str = "MEMBER_MONITOR_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".member-monitor";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the state directory.
///
/// `MEMBER_MONITOR_STATE_DIR` if set, else `~/.member-monitor`, else
/// `.member-monitor` in the current directory.
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| resolve_state_dir(std::env::var(STATE_DIR_ENV).ok(), dirs::home_dir()))
        .clone()
}

fn resolve_state_dir(env_override: Option<String>, home: Option<PathBuf>) -> PathBuf {
    match env_override.filter(|dir| !dir.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home
            .map(|h| h.join(DEFAULT_STATE_DIR))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR)),
    }
}

/// Default config file path.
pub fn config_file() -> PathBuf {
    config_file_in(&state_dir())
}

fn config_file_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Optional `.env` file in the state directory.
pub fn env_file() -> PathBuf {
    state_dir().join(".env")
}
