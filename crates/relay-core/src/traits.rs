use crate::{
    error::RelayError,
    format::{progress_message, prompt_messages, CHUNK_PACING},
    message::{ChatMessage, CompactPromptData, ProgressSnapshot},
};
use async_trait::async_trait;
use tracing::debug;

/// Notification dispatcher. The delivery seam between session and backend.
///
/// Implementors provide a single-message primitive; prompt chunking, pacing,
/// and progress formatting are shared on top of it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Deliver exactly one message. No retries.
    async fn send_message(&self, message: &ChatMessage) -> Result<(), RelayError>;

    /// Deliver a prompt, split into numbered chunks when it exceeds the
    /// backend's length ceiling.
    ///
    /// Chunks go out strictly in order with [`CHUNK_PACING`] between them.
    /// The first failed chunk aborts the rest.
    async fn send_compact_prompt(&self, data: &CompactPromptData) -> Result<(), RelayError> {
        let messages = prompt_messages(&data.prompt);
        let total = messages.len();

        for (i, message) in messages.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(CHUNK_PACING).await;
            }
            self.send_message(message).await?;
            debug!("{}: delivered prompt chunk {}/{total}", self.name(), i + 1);
        }

        Ok(())
    }

    /// Deliver a single rich progress message for the snapshot.
    async fn send_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), RelayError> {
        self.send_message(&progress_message(snapshot)).await
    }
}
