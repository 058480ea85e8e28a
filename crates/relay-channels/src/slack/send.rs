//! Low-level webhook POST for [`SlackNotifier`].

use super::SlackNotifier;
use async_trait::async_trait;
use relay_core::{error::RelayError, message::ChatMessage, traits::Notifier};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send_message(&self, message: &ChatMessage) -> Result<(), RelayError> {
        let body = serde_json::to_string(message)?;
        debug!("slack payload to {}: {body}", self.redacted_url());

        let resp = self
            .client
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| RelayError::Delivery(format!("slack webhook request failed: {e}")))?;

        let status = resp.status();
        info!("slack webhook responded {status}");

        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            warn!("slack webhook got {status}: {error_text}");
            return Err(RelayError::Delivery(format!(
                "slack webhook failed ({status}): {error_text}"
            )));
        }

        Ok(())
    }
}
