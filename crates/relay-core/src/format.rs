//! Message shaping for webhook delivery: length-limited chunking and the
//! rich progress message.

use crate::message::{Block, ChatMessage, ProgressSnapshot, TextObject};
use std::time::Duration;

/// Hard per-message text ceiling of the chat backend, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Delay between consecutive chunks of one prompt.
pub const CHUNK_PACING: Duration = Duration::from_millis(500);

/// Width of the rendered progress bar, in cells.
pub const PROGRESS_BAR_WIDTH: usize = 20;

const PROGRESS_TITLE: &str = "\u{1F4CA} Task Progress Update";
const PROGRESS_PREVIEW: &str = "Task Progress Update";
const NO_SESSION: &str = "N/A";

/// Split text into consecutive slices of exactly `max_chars` characters
/// (the last may be shorter).
///
/// Counts Unicode scalar values, so slices never cut a multi-byte character.
/// Word and line boundaries are ignored.
pub fn split_by_chars(text: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 || text.is_empty() {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);

    chunks
}

/// Build the ordered messages for one prompt.
///
/// Prompts within [`MAX_MESSAGE_CHARS`] go out as a single unnumbered message.
/// Longer prompts are split and each chunk is prefixed with `(i/N) `.
pub fn prompt_messages(prompt: &str) -> Vec<ChatMessage> {
    if prompt.chars().count() <= MAX_MESSAGE_CHARS {
        return vec![ChatMessage::text(prompt)];
    }

    let chunks = split_by_chars(prompt, MAX_MESSAGE_CHARS);
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| ChatMessage::text(format!("({}/{total}) {chunk}", i + 1)))
        .collect()
}

/// Render a progress bar like `██████████░░░░░░░░░░ 50%`.
pub fn progress_bar(rate: u32) -> String {
    let rate = rate.min(100);
    let filled = (rate as f64 / 100.0 * PROGRESS_BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{} {rate}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// Build the rich progress notification for a snapshot. Never chunked.
pub fn progress_message(snapshot: &ProgressSnapshot) -> ChatMessage {
    let rate = snapshot.completion_rate();
    let session = snapshot.session_id.as_deref().unwrap_or(NO_SESSION);

    let mut blocks = vec![
        Block::header(PROGRESS_TITLE),
        Block::fields(vec![
            TextObject::mrkdwn(format!("*Current Task:* {}", snapshot.current_task)),
            TextObject::mrkdwn(format!(
                "*Progress:* {}/{} ({rate}%)",
                snapshot.completed_tasks.len(),
                snapshot.total_tasks
            )),
            TextObject::mrkdwn(format!("*Time:* {}", snapshot.timestamp)),
            TextObject::mrkdwn(format!("*Session:* {session}")),
        ]),
        Block::section(progress_bar(rate)),
    ];

    if !snapshot.completed_tasks.is_empty() {
        let list = snapshot
            .completed_tasks
            .iter()
            .map(|name| format!("\u{2022} {name}"))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(Block::section(format!("*Completed Tasks:*\n{list}")));
    }

    ChatMessage::with_blocks(PROGRESS_PREVIEW, blocks)
}
