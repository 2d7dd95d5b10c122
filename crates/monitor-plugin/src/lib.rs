//! Chat-bot plugin for the member monitor.
//!
//! A host feeds every inbound message into [`MemberMonitor`] through the
//! [`Plugin`] trait. Text messages from a group chat the monitor has not seen
//! yet start tracking that group; text matching one of the commands below is
//! consumed and answered through the context's reply slot. Everything else is
//! passed on with [`EventAction::Continue`].
//!
//! # Commands
//!
//! - `enable monitor` / `disable monitor` - start or stop the poll loop
//! - `enable join notice` / `disable join notice` - welcome messages
//! - `enable exit notice` / `disable exit notice` - farewell messages
//! - `show status` - feature and loop status
//! - `refresh members` - reload the current group's roster silently
//! - `set interval <seconds>` - poll interval, at least 5 seconds
//! - `add monitored group` / `remove monitored group` - edit the explicit list
//! - `list monitored groups` - show the explicit list
//! - `monitor help` - command list

pub mod commands;
pub mod host;
pub mod plugin;

pub use commands::Command;
pub use host::{ContextKind, EventAction, MessageContext, Plugin};
pub use plugin::{MemberMonitor, PLUGIN_NAME};
