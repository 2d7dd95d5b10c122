//! The persisted monitor configuration record.

use serde::{Deserialize, Serialize};

use crate::ids::GroupId;

/// Smallest accepted poll interval, in seconds.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 5;

/// Poll interval used when none is configured, in seconds.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Placeholder substituted with the member's display name.
pub const NICKNAME_PLACEHOLDER: &str = "{nickname}";

/// Kind of membership notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A member arrived.
    Join,
    /// A member departed.
    Leave,
}

impl NoticeKind {
    /// Human-readable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            NoticeKind::Join => "join notice",
            NoticeKind::Leave => "exit notice",
        }
    }
}

/// Monitor settings, loaded at start and saved after every change.
///
/// Every field has a default so partial documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Master switch for the poll loop.
    pub enable_monitor: bool,
    /// Send a message when a member joins.
    pub enable_join_notice: bool,
    /// Send a message when a member leaves.
    pub enable_exit_notice: bool,
    /// Seconds between poll cycles.
    pub check_interval: u64,
    /// Explicitly tracked groups. Empty means every group already seen.
    pub monitor_groups: Vec<GroupId>,
    /// Welcome templates, one picked at random.
    pub join_prompt_templates: Vec<String>,
    /// Farewell templates, one picked at random.
    pub exit_prompt_templates: Vec<String>,
    /// Start tracking a group as soon as a message arrives from it.
    pub auto_track_groups: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enable_monitor: true,
            enable_join_notice: true,
            enable_exit_notice: true,
            check_interval: DEFAULT_CHECK_INTERVAL_SECS,
            monitor_groups: Vec::new(),
            join_prompt_templates: default_join_templates(),
            exit_prompt_templates: default_exit_templates(),
            auto_track_groups: true,
        }
    }
}

impl MonitorConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    pub fn with_check_interval(mut self, secs: u64) -> Self {
        self.check_interval = secs;
        self
    }

    /// Sets the explicitly tracked groups.
    pub fn with_monitor_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.monitor_groups = groups.into_iter().collect();
        self
    }

    /// Sets the templates for one notice kind.
    pub fn with_templates(mut self, kind: NoticeKind, templates: Vec<String>) -> Self {
        match kind {
            NoticeKind::Join => self.join_prompt_templates = templates,
            NoticeKind::Leave => self.exit_prompt_templates = templates,
        }
        self
    }

    /// Returns whether notices of this kind are enabled.
    pub fn notice_enabled(&self, kind: NoticeKind) -> bool {
        match kind {
            NoticeKind::Join => self.enable_join_notice,
            NoticeKind::Leave => self.enable_exit_notice,
        }
    }

    /// Returns the templates for a notice kind.
    pub fn templates(&self, kind: NoticeKind) -> &[String] {
        match kind {
            NoticeKind::Join => &self.join_prompt_templates,
            NoticeKind::Leave => &self.exit_prompt_templates,
        }
    }

    /// Returns true if the group is in the explicit list.
    pub fn is_listed(&self, group: &GroupId) -> bool {
        self.monitor_groups.contains(group)
    }

    /// Adds a group to the explicit list. Returns false if already listed.
    pub fn add_group(&mut self, group: GroupId) -> bool {
        if self.is_listed(&group) {
            return false;
        }
        self.monitor_groups.push(group);
        true
    }

    /// Removes a group from the explicit list. Returns false if absent.
    pub fn remove_group(&mut self, group: &GroupId) -> bool {
        let before = self.monitor_groups.len();
        self.monitor_groups.retain(|g| g != group);
        self.monitor_groups.len() != before
    }
}

fn default_join_templates() -> Vec<String> {
    [
        "A warm welcome to {nickname}! We look forward to hearing from you.",
        "Welcome aboard, {nickname}! The group just got a little livelier.",
        "Hey {nickname}, glad you made it! Say hello to everyone.",
        "{nickname} has arrived. Welcome, and enjoy the ride!",
        "A friend from afar! Welcome to the group, {nickname}.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exit_templates() -> Vec<String> {
    [
        "{nickname} has left the group, waving goodbye without a word.",
        "Farewell, {nickname}! Safe travels.",
        "Someone is missing... {nickname} quietly slipped away.",
        "{nickname} left the group; the rest of us will miss them.",
        "{nickname} has left. Hope to see you again!",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
