//! Runtime events.

use monitor_models::{GroupId, Member};

/// Events emitted by the poll loop.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A group was observed for the first time.
    BaselineRecorded {
        /// Group ID.
        group: GroupId,
        /// Number of members recorded.
        members: usize,
    },
    /// A member appeared in a group.
    MemberJoined {
        /// Group ID.
        group: GroupId,
        /// The new member.
        member: Member,
    },
    /// A member disappeared from a group.
    MemberLeft {
        /// Group ID.
        group: GroupId,
        /// The departed member, with the name last seen.
        member: Member,
    },
    /// A roster fetch failed; the old snapshot was kept.
    FetchFailed {
        /// Group ID.
        group: GroupId,
        /// Error message.
        error: String,
    },
    /// A poll cycle finished.
    CycleCompleted {
        /// Groups polled successfully.
        groups: usize,
        /// Groups whose fetch failed.
        failures: usize,
    },
}

impl MonitorEvent {
    /// Returns the group this event concerns, if any.
    pub fn group(&self) -> Option<&GroupId> {
        match self {
            MonitorEvent::BaselineRecorded { group, .. }
            | MonitorEvent::MemberJoined { group, .. }
            | MonitorEvent::MemberLeft { group, .. }
            | MonitorEvent::FetchFailed { group, .. } => Some(group),
            MonitorEvent::CycleCompleted { .. } => None,
        }
    }

    /// Returns true if this is a membership change.
    pub fn is_membership_change(&self) -> bool {
        matches!(
            self,
            MonitorEvent::MemberJoined { .. } | MonitorEvent::MemberLeft { .. }
        )
    }
}
