//! The surface a bot host exposes to plugins.

use async_trait::async_trait;
use monitor_models::GroupId;

/// Kind of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Text,
    Image,
    Voice,
    Other,
}

/// What the host should do after a plugin saw an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Pass the event on to the rest of the pipeline.
    Continue,
    /// The plugin consumed the event; stop dispatching.
    Handled,
}

/// One inbound message as seen by a plugin.
#[derive(Debug, Clone)]
pub struct MessageContext {
    /// Message text.
    pub content: String,
    pub kind: ContextKind,
    /// Group the message was posted in; `None` for direct chats.
    pub group: Option<GroupId>,
    /// Sender ID, if the host knows it.
    pub sender: Option<String>,
    /// Reply set by the plugin that handled the message.
    pub reply: Option<String>,
}

impl MessageContext {
    /// Creates a text message context outside any group.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: ContextKind::Text,
            group: None,
            sender: None,
            reply: None,
        }
    }

    /// Attributes the message to a group.
    pub fn in_group(mut self, group: impl Into<GroupId>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the sender.
    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Overrides the message kind.
    pub fn with_kind(mut self, kind: ContextKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A plugin loaded into the host's dispatch pipeline.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name used in logs.
    fn name(&self) -> &str;

    /// Called for every inbound message.
    async fn on_message(&self, ctx: &mut MessageContext) -> EventAction;

    /// Usage text shown by the host's help command.
    fn help_text(&self) -> String;

    /// Called once when the host unloads the plugin.
    async fn on_deactivate(&self) {}
}
