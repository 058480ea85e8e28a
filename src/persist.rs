//! CLI tracker persistence at `<data_dir>/progress.json`.
//!
//! Each CLI invocation is its own process, so the task list is saved after
//! every mutating command and restored on start-up. The MCP server keeps its
//! tracker in memory only.

use relay_core::{error::RelayError, shellexpand};
use relay_progress::TrackerState;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STATE_FILE: &str = "progress.json";

pub fn state_path(data_dir: &str) -> PathBuf {
    Path::new(&shellexpand(data_dir)).join(STATE_FILE)
}

/// Load saved tracker state. Missing or corrupt files yield `None`.
pub fn load_state(data_dir: &str) -> Option<TrackerState> {
    let path = state_path(data_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            debug!("no saved progress at {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("ignoring corrupt progress file {}: {e}", path.display());
            None
        }
    }
}

pub fn save_state(data_dir: &str, state: &TrackerState) -> Result<(), RelayError> {
    let path = state_path(data_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(state)?)?;
    debug!("saved progress to {}", path.display());
    Ok(())
}
