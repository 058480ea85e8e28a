//! Adapter session: config, notifier, and task tracker behind one context object.
//!
//! Both the CLI and the MCP server drive a [`Session`]. Every operation returns
//! a short human-readable status line.


use relay_channels::SlackNotifier;
use relay_core::{
    config::RelayConfig,
    error::RelayError,
    message::CompactPromptData,
    normalize::{normalize, summarize},
    redact_url,
    traits::Notifier,
};
use relay_progress::{Task, TaskTracker, TrackerState};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

const NOT_CONFIGURED: &str = "Slack not configured. Use configure_slack first.";
const SUMMARY_PREVIEW_CHARS: usize = 100;

/// Builds a notifier for a webhook URL.
pub type NotifierFactory = Box<dyn Fn(&str) -> Arc<dyn Notifier> + Send + Sync>;

/// Runtime reconfiguration. `None` fields keep the current value.
#[derive(Debug, Clone, Default)]
pub struct ConfigureRequest {
    pub webhook_url: Option<String>,
    pub session_id: Option<String>,
    pub enable_progress: Option<bool>,
    pub enable_compact_prompts: Option<bool>,
}

/// Progress summary returned by `get_progress`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub current: String,
    pub completed: usize,
    pub total: usize,
    pub completion_rate: f64,
    pub tasks: Vec<Task>,
}

pub struct Session {
    config: RelayConfig,
    notifier: Option<Arc<dyn Notifier>>,
    tracker: TaskTracker,
    factory: NotifierFactory,
}

impl Session {
    /// Session delivering to Slack when a webhook URL is configured.
    pub fn new(config: RelayConfig) -> Self {
        Self::with_factory(
            config,
            Box::new(|url: &str| Arc::new(SlackNotifier::new(url)) as Arc<dyn Notifier>),
        )
    }

    pub fn with_factory(config: RelayConfig, factory: NotifierFactory) -> Self {
        let notifier = config.webhook_url.as_deref().map(|url| factory(url));
        let tracker = TaskTracker::new(config.session_id.clone());
        Self {
            config,
            notifier,
            tracker,
            factory,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.notifier.is_some()
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }

    /// Replace the tracker with restored state.
    ///
    /// Ignored when a session id is configured and the saved state belongs to
    /// a different session.
    pub fn restore_tracker(&mut self, state: TrackerState) {
        if let Some(ref id) = self.config.session_id {
            if *id != state.session_id {
                debug!(
                    "saved progress belongs to session {}, starting fresh for {id}",
                    state.session_id
                );
                return;
            }
        }
        self.tracker = TaskTracker::from_state(state);
    }

    pub fn configure(&mut self, req: ConfigureRequest) -> Result<String, RelayError> {
        let webhook_url = req
            .webhook_url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.config.webhook_url.clone())
            .ok_or_else(|| {
                RelayError::Config(
                    "Slack webhook URL must be provided either as parameter or via SLACK_WEBHOOK_URL"
                        .to_string(),
                )
            })?;

        if let Some(id) = req.session_id.filter(|s| !s.trim().is_empty()) {
            if id != self.tracker.session_id() {
                info!("starting new progress session {id}");
                self.tracker = TaskTracker::new(Some(id.clone()));
            }
            self.config.session_id = Some(id);
        }
        if let Some(enabled) = req.enable_progress {
            self.config.enable_progress = enabled;
        }
        if let Some(enabled) = req.enable_compact_prompts {
            self.config.enable_compact_prompts = enabled;
        }

        let redacted = redact_url(&webhook_url);
        self.notifier = Some((self.factory)(&webhook_url));
        self.config.webhook_url = Some(webhook_url);
        info!("webhook configured: {redacted}");

        Ok(format!(
            "Slack configuration updated successfully. Using webhook URL: {redacted}"
        ))
    }

    pub async fn send_compact_prompt(
        &self,
        prompt: &str,
        session_id: Option<String>,
    ) -> Result<String, RelayError> {
        let notifier = self.notifier()?;
        if !self.config.enable_compact_prompts {
            return Ok("Compact prompts are disabled".to_string());
        }

        let summary = summarize(prompt);
        let session_id = session_id
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.config.session_id.clone())
            .unwrap_or_else(|| self.tracker.session_id().to_string());
        let data = CompactPromptData::new(normalize(prompt), Some(session_id));

        notifier.send_compact_prompt(&data).await?;

        let preview: String = summary.chars().take(SUMMARY_PREVIEW_CHARS).collect();
        Ok(format!("Compact prompt sent to Slack: {preview}"))
    }

    pub fn add_task(&mut self, id: &str, name: &str) -> String {
        self.tracker.add_task(id, name);
        format!("Task added: {name}")
    }

    /// Mark a task complete and, when enabled, report progress.
    pub async fn complete_task(&mut self, id: &str) -> Result<String, RelayError> {
        self.tracker.complete_task(id);

        match self.notifier.as_ref() {
            Some(notifier) if self.config.enable_progress => {
                notifier.send_progress(&self.tracker.current_progress()).await?;
                Ok(format!("Task completed: {id} (progress sent to Slack)"))
            }
            _ => Ok(format!("Task completed: {id}")),
        }
    }

    pub fn set_current_task(&mut self, name: &str) -> String {
        self.tracker.set_current_task(name);
        format!("Current task set: {name}")
    }

    pub async fn send_progress(&self) -> Result<String, RelayError> {
        let notifier = self.notifier()?;
        if !self.config.enable_progress {
            return Ok("Progress tracking is disabled".to_string());
        }

        let snapshot = self.tracker.current_progress();
        notifier.send_progress(&snapshot).await?;
        Ok(format!(
            "Progress sent to Slack: {}/{} tasks completed",
            snapshot.completed_tasks.len(),
            snapshot.total_tasks
        ))
    }

    pub fn progress_report(&self) -> ProgressReport {
        ProgressReport {
            current: self.tracker.current_task().to_string(),
            completed: self.tracker.completed_count(),
            total: self.tracker.total_count(),
            completion_rate: self.tracker.completion_rate(),
            tasks: self.tracker.tasks().to_vec(),
        }
    }

    pub fn reset_progress(&mut self) -> String {
        self.tracker.reset();
        "Progress tracking reset".to_string()
    }

    fn notifier(&self) -> Result<&Arc<dyn Notifier>, RelayError> {
        self.notifier
            .as_ref()
            .ok_or_else(|| RelayError::Config(NOT_CONFIGURED.to_string()))
    }
}
