//! Default values and environment variable names for config resolution.

pub const WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";
pub const SESSION_ENV: &str = "SESSION_ID";
pub const ENABLE_PROGRESS_ENV: &str = "ENABLE_PROGRESS";
pub const ENABLE_COMPACT_PROMPTS_ENV: &str = "ENABLE_COMPACT_PROMPTS";

pub fn default_data_dir() -> String {
    "~/.compact-slack".to_string()
}

pub fn default_true() -> bool {
    true
}
