use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A normalized prompt, stamped at send time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactPromptData {
    /// Normalized prompt text.
    pub prompt: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl CompactPromptData {
    /// Build prompt data stamped with the current time.
    pub fn new(prompt: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            timestamp: now_timestamp(),
            session_id,
        }
    }
}

/// Point-in-time copy of a task tracker's state.
///
/// Values are copied out of the tracker, so later tracker mutations are not
/// observed. Take a new snapshot to see updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Free-text label; not required to match any task id.
    pub current_task: String,
    /// Names (not ids) of completed tasks, in tracker order.
    pub completed_tasks: Vec<String>,
    pub total_tasks: usize,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ProgressSnapshot {
    /// Completion percentage rounded to the nearest integer, `0` for an empty set.
    pub fn completion_rate(&self) -> u32 {
        if self.total_tasks == 0 {
            return 0;
        }
        let rate = self.completed_tasks.len() as f64 / self.total_tasks as f64 * 100.0;
        rate.round().clamp(0.0, 100.0) as u32
    }
}

/// Wire payload for one webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Plain text; also used as the notification preview when blocks are present.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
}

impl ChatMessage {
    /// A plain-text message with no blocks.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blocks: None,
        }
    }

    /// A rich message with a preview text and an ordered list of blocks.
    pub fn with_blocks(text: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            text: text.into(),
            blocks: Some(blocks),
        }
    }
}

/// Block kinds used for rich rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Header,
    Section,
}

/// Text object formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    PlainText,
    Mrkdwn,
}

/// A formatted text element inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::PlainText,
            text: text.into(),
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Mrkdwn,
            text: text.into(),
        }
    }
}

/// One rich-rendering block: a header, a section of fields, or a section of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<TextObject>>,
}

impl Block {
    /// Header block with plain-text title.
    pub fn header(title: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Header,
            text: Some(TextObject::plain(title)),
            fields: None,
        }
    }

    /// Section block holding a list of markdown fields.
    pub fn fields(fields: Vec<TextObject>) -> Self {
        Self {
            kind: BlockKind::Section,
            text: None,
            fields: Some(fields),
        }
    }

    /// Section block holding a single markdown text.
    pub fn section(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Section,
            text: Some(TextObject::mrkdwn(text)),
            fields: None,
        }
    }
}
