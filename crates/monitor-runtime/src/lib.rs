//! Async runtime for the member monitor.
//!
//! This crate provides the background roster polling for the monitor:
//! - `MessagingClient` - the host surface used to read rosters and post text
//! - `RosterPoller` - the loop that diffs rosters and announces changes
//! - `MonitorRuntime` - main entry point owning the state and the loop
//!
//! # Example
//!
//! ```ignore
//! use monitor_persistence::ConfigStore;
//! use monitor_runtime::{MonitorRuntime, MonitorState, RuntimeConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = Arc::new(MonitorState::load(ConfigStore::in_dir("/tmp/monitor"))?);
//!     let client = Arc::new(MyClient::new());
//!     let runtime = MonitorRuntime::new(state, client, RuntimeConfig::default());
//!
//!     let mut events = runtime.subscribe();
//!     runtime.start().await;
//!
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!     runtime.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Key Concepts
//!
//! ## Working set
//!
//! Each cycle polls the configured `monitor_groups`. When that list is empty
//! it polls every group that already has a snapshot, so groups only enter
//! monitoring through an explicit add, a refresh or auto-tracking.
//!
//! ## Cycles
//!
//! A cycle fetches each group in turn. The first observation of a group is a
//! silent baseline; later observations are diffed against the stored
//! snapshot and each left or joined member gets one notice. A failing group
//! is skipped and never aborts the others.

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod notifier;
pub mod poller;
pub mod runtime;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{fetch_snapshot, ClientError, MessagingClient};
pub use config::RuntimeConfig;
pub use error::{MonitorError, Result};
pub use event::MonitorEvent;
pub use notifier::Notifier;
pub use poller::RosterPoller;
pub use runtime::MonitorRuntime;
pub use state::{GroupSource, MonitorState};
pub use store::{Applied, RosterStore};
