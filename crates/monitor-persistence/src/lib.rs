//! Persistence layer for the member monitor.
//!
//! The only durable state is the [`MonitorConfig`](monitor_models::MonitorConfig)
//! document. It is written with atomic file operations (write to temp file,
//! then rename) after every change. Roster snapshots are kept in memory only.
//!
//! # Example
//!
//! ```no_run
//! use monitor_persistence::ConfigStore;
//!
//! let store = ConfigStore::in_dir("/home/user/.member-monitor");
//! let mut config = store.load_or_init().unwrap();
//! config.check_interval = 30;
//! store.save(&config).unwrap();
//! ```

pub mod atomic;
pub mod config_store;
pub mod error;

pub use config_store::{ConfigStore, CONFIG_FILE_NAME};
pub use error::{PersistenceError, Result};
