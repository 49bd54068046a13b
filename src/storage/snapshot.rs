//! Match snapshots on disk.
//!
//! A snapshot is the JSON serialization of a [`MatchState`]. Snapshots are
//! only written when explicitly requested; loading validates the match
//! invariants before handing the state out.

use std::path::{Path, PathBuf};

use crate::core::MatchState;
use crate::error::Result;
use crate::util::{atomic_write, read_capped, MAX_READ_BYTES};

/// File extension used for snapshots.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Write a snapshot atomically.
pub fn save_snapshot(state: &MatchState, path: &Path) -> Result<PathBuf> {
    let path = with_extension(path);
    let json = serde_json::to_string_pretty(state)?;
    atomic_write(&path, json.as_bytes())?;
    tracing::info!(path = %path.display(), players = state.players.len(), "snapshot saved");
    Ok(path)
}

/// Read and validate a snapshot.
pub fn load_snapshot(path: &Path) -> Result<MatchState> {
    let content = read_capped(path, MAX_READ_BYTES)?;
    let state: MatchState = serde_json::from_str(&content)?;
    state.validate()?;
    tracing::debug!(path = %path.display(), sets = state.set_count, "snapshot loaded");
    Ok(state)
}

/// Add the `.json` extension when the path has none.
fn with_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(SNAPSHOT_EXTENSION)
    }
}
