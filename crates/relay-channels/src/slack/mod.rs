//! Slack incoming-webhook backend.
//!
//! Every message is one JSON `POST` to the webhook URL. Slack answers `200 ok`
//! on success; anything else is surfaced as a delivery error.

pub(crate) mod send;


use relay_core::redact_url;

/// Notifier that posts to a Slack incoming webhook.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    /// The webhook URL with its secret path elided, safe for logs and replies.
    pub fn redacted_url(&self) -> String {
        redact_url(&self.webhook_url)
    }
}
