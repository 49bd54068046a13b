//! Match storage for volley-stats.
//!
//! Matches live in memory while they are recorded. This module only
//! handles explicit JSON snapshots of a finished or paused match.

pub mod snapshot;

pub use snapshot::{load_snapshot, save_snapshot, SNAPSHOT_EXTENSION};
