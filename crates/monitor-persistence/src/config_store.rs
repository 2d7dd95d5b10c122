//! Load/save of the [`MonitorConfig`] document.

use std::path::{Path, PathBuf};

use monitor_models::MonitorConfig;
use tracing::{debug, info};

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;

/// Default file name of the configuration document.
pub const CONFIG_FILE_NAME: &str = "member_monitor.json";

/// Persists the monitor configuration as a single JSON file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for [`CONFIG_FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config, or `None` if the file does not exist yet.
    pub fn load(&self) -> Result<Option<MonitorConfig>> {
        read_json_optional(&self.path)
    }

    /// Loads the config, writing and returning defaults if absent.
    pub fn load_or_init(&self) -> Result<MonitorConfig> {
        if let Some(config) = self.load()? {
            debug!(path = %self.path.display(), "loaded monitor config");
            return Ok(config);
        }

        let config = MonitorConfig::default();
        self.save(&config)?;
        info!(path = %self.path.display(), "wrote default monitor config");
        Ok(config)
    }

    /// Saves the config atomically.
    pub fn save(&self, config: &MonitorConfig) -> Result<()> {
        atomic_write_json(&self.path, config)?;
        debug!(path = %self.path.display(), "saved monitor config");
        Ok(())
    }
}
