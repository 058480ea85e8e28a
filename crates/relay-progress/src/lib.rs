//! # relay-progress
//!
//! In-memory task checklist and progress tracking for relay. State lives only
//! in process memory; callers that need it across restarts export and restore
//! a [`TrackerState`].

mod tracker;

pub use tracker::{Task, TaskList, TaskTracker, TrackerState};
