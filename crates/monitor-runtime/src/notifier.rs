//! Join/leave message composition and delivery.

use std::sync::Arc;
use std::time::Duration;

use monitor_models::{GroupId, NoticeKind, NICKNAME_PLACEHOLDER};
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::client::{ClientError, MessagingClient};

const FALLBACK_JOIN: &str = "Welcome {nickname} to the group!";
const FALLBACK_LEAVE: &str = "{nickname} has left the group.";

/// Turns membership events into outbound chat messages.
pub struct Notifier {
    client: Arc<dyn MessagingClient>,
    timeout: Duration,
}

impl Notifier {
    /// Creates a notifier sending through `client`.
    pub fn new(client: Arc<dyn MessagingClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Builds the message text for one event.
    ///
    /// Picks a template uniformly at random; with no templates the fixed
    /// fallback for `kind` is used.
    pub fn compose(kind: NoticeKind, nickname: &str, templates: &[String]) -> String {
        let fallback = match kind {
            NoticeKind::Join => FALLBACK_JOIN,
            NoticeKind::Leave => FALLBACK_LEAVE,
        };
        let template = templates
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(fallback);
        template.replace(NICKNAME_PLACEHOLDER, nickname)
    }

    /// Composes and sends a notice. Returns true if it was delivered.
    ///
    /// Failures are logged and not retried.
    pub async fn notify(
        &self,
        group: &GroupId,
        kind: NoticeKind,
        nickname: &str,
        templates: &[String],
    ) -> bool {
        let text = Self::compose(kind, nickname, templates);

        let result = tokio::time::timeout(self.timeout, self.client.send_text(group, &text))
            .await
            .unwrap_or(Err(ClientError::Timeout(self.timeout)));

        match result {
            Ok(()) => {
                info!(group = %group, kind = kind.label(), text = %text, "sent notice");
                true
            }
            Err(e) => {
                warn!(group = %group, kind = kind.label(), error = %e, "failed to send notice");
                false
            }
        }
    }
}
