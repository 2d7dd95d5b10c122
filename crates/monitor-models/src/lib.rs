//! Core data models for the member monitor.
//!
//! This crate provides the types shared by every other crate: group and
//! member IDs, roster snapshots with their diff, and the persisted
//! configuration record.

pub mod config;
pub mod ids;
pub mod roster;

pub use config::{
    MonitorConfig, NoticeKind, DEFAULT_CHECK_INTERVAL_SECS, MIN_CHECK_INTERVAL_SECS,
    NICKNAME_PLACEHOLDER,
};
pub use ids::{GroupId, MemberId};
pub use roster::{Member, RosterDiff, RosterSnapshot};
