//! Session-scoped state: diversity trackers.

pub mod trackers;

pub use trackers::{RecentItemsTracker, SessionTrackers, TaskSizeTracker, TaskTypeTracker};
