//! The messaging client surface the monitor needs from its host.

use std::time::Duration;

use async_trait::async_trait;
use monitor_models::{GroupId, Member, RosterSnapshot};
use thiserror::Error;

/// Errors reported by a [`MessagingClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The API reported a failure in its response envelope.
    #[error("API error (ret={ret}): {message}")]
    Api { ret: i64, message: String },

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The roster came back without members.
    #[error("roster is empty")]
    EmptyRoster,

    /// The call did not complete in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Client used to read group rosters and post messages.
///
/// Implementations must be cheap to share; the runtime holds one behind an
/// `Arc` and calls it from both the poll loop and command handlers.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Fetches the current member list of a group.
    async fn fetch_roster(&self, group: &GroupId) -> Result<Vec<Member>, ClientError>;

    /// Posts a text message to a group.
    async fn send_text(&self, group: &GroupId, text: &str) -> Result<(), ClientError>;

    /// Returns true if the ID names a group chat rather than a direct chat.
    fn is_group(&self, _group: &GroupId) -> bool {
        true
    }
}

/// Fetches a roster under a timeout and turns it into a snapshot.
///
/// An empty member list is reported as [`ClientError::EmptyRoster`] so that
/// callers never replace a real snapshot with an empty one.
pub async fn fetch_snapshot(
    client: &dyn MessagingClient,
    group: &GroupId,
    timeout: Duration,
) -> Result<RosterSnapshot, ClientError> {
    let members = tokio::time::timeout(timeout, client.fetch_roster(group))
        .await
        .map_err(|_| ClientError::Timeout(timeout))??;

    if members.is_empty() {
        return Err(ClientError::EmptyRoster);
    }

    Ok(RosterSnapshot::from_members(members))
}
