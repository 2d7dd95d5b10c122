//! Error types for the runtime crate.

use thiserror::Error;

use crate::client::ClientError;

/// Errors that can occur in the runtime.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The messaging client failed.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// The configuration could not be saved.
    #[error("persistence error: {0}")]
    Persistence(#[from] monitor_persistence::PersistenceError),

    /// The target is not a group chat.
    #[error("not a group chat: {0}")]
    NotAGroup(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
