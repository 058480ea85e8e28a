//! Task checklist state machine with derived progress metrics.

use chrono::Utc;
use relay_core::message::{now_timestamp, ProgressSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// Insertion-ordered `id → task` map.
///
/// Enumeration order is the order ids were first inserted. Re-inserting an
/// existing id replaces its record in place without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    entries: Vec<Task>,
}

impl TaskList {
    /// Insert or replace the task with `task.id`.
    pub fn upsert(&mut self, task: Task) {
        match self.entries.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => self.entries.push(task),
        }
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.entries.iter_mut().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Serializable export of a tracker, for adapters that persist state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    pub session_id: String,
    #[serde(default)]
    pub current_task: String,
    #[serde(default)]
    pub tasks: TaskList,
}

/// Tracks a checklist of tasks, a free-text current-task label, and a session id.
///
/// The current-task label is a caption only; it is never checked against
/// the tracked task ids.
#[derive(Debug, Clone)]
pub struct TaskTracker {
    tasks: TaskList,
    current_task: String,
    session_id: String,
}

impl TaskTracker {
    /// Create a tracker. A session id is generated when none is given.
    pub fn new(session_id: Option<String>) -> Self {
        Self {
            tasks: TaskList::default(),
            current_task: String::new(),
            session_id: session_id.unwrap_or_else(generate_session_id),
        }
    }

    /// Rebuild a tracker from exported state.
    pub fn from_state(state: TrackerState) -> Self {
        Self {
            tasks: state.tasks,
            current_task: state.current_task,
            session_id: state.session_id,
        }
    }

    /// Export the full tracker state.
    pub fn state(&self) -> TrackerState {
        TrackerState {
            session_id: self.session_id.clone(),
            current_task: self.current_task.clone(),
            tasks: self.tasks.clone(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn current_task(&self) -> &str {
        &self.current_task
    }

    /// Insert or overwrite the task at `id` as not completed.
    pub fn add_task(&mut self, id: &str, name: &str) {
        self.tasks.upsert(Task {
            id: id.to_string(),
            name: name.to_string(),
            completed: false,
        });
    }

    /// Mark the task at `id` completed. Unknown ids are ignored.
    pub fn complete_task(&mut self, id: &str) {
        match self.tasks.get_mut(id) {
            Some(task) => task.completed = true,
            None => debug!("complete_task: unknown task id {id:?}, ignoring"),
        }
    }

    pub fn set_current_task(&mut self, name: &str) {
        self.current_task = name.to_string();
    }

    /// Snapshot the tracker at call time.
    pub fn current_progress(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            current_task: self.current_task.clone(),
            completed_tasks: self
                .tasks
                .iter()
                .filter(|t| t.completed)
                .map(|t| t.name.clone())
                .collect(),
            total_tasks: self.tasks.len(),
            timestamp: now_timestamp(),
            session_id: Some(self.session_id.clone()),
        }
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.tasks.len()
    }

    /// Percentage of completed tasks in `[0, 100]`; `0` when there are none.
    pub fn completion_rate(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.total_count() as f64 * 100.0
    }

    /// Clear tasks and the current-task label. The session id is kept.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.current_task.clear();
    }
}

fn generate_session_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}
