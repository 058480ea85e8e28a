//! Configuration resolution.
//!
//! Values come from three places, highest priority first:
//! 1. Environment variables (`SLACK_WEBHOOK_URL`, `SESSION_ID`,
//!    `ENABLE_PROGRESS`, `ENABLE_COMPACT_PROMPTS`).
//! 2. The global config file `~/.compact-slack/config.toml`.
//! 3. A `SLACK_WEBHOOK_URL=` entry in the project-local `.env` (webhook only).

mod defaults;


pub use defaults::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::RelayError;

const CONFIG_FILE: &str = "config.toml";

/// Settings persisted in the global config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_progress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_compact_prompts: Option<bool>,
}

impl GlobalConfig {
    /// Overlay `update` on `self`: set fields in `update` win, unset ones keep `self`.
    pub fn merge(self, update: &GlobalConfig) -> GlobalConfig {
        GlobalConfig {
            webhook_url: update.webhook_url.clone().or(self.webhook_url),
            session_id: update.session_id.clone().or(self.session_id),
            enable_progress: update.enable_progress.or(self.enable_progress),
            enable_compact_prompts: update.enable_compact_prompts.or(self.enable_compact_prompts),
        }
    }
}

/// Effective configuration handed to the adapter surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default = "default_true")]
    pub enable_progress: bool,
    #[serde(default = "default_true")]
    pub enable_compact_prompts: bool,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            session_id: None,
            enable_progress: default_true(),
            enable_compact_prompts: default_true(),
            data_dir: default_data_dir(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Shorten a webhook URL to scheme and host so the secret path never reaches logs.
pub fn redact_url(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => match rest.split_once('/') {
            Some((host, path)) if !path.is_empty() => format!("{scheme}://{host}/\u{2026}"),
            _ => url.to_string(),
        },
        None => "[redacted]".to_string(),
    }
}

/// Path of the global config file inside `data_dir`.
pub fn config_path(data_dir: &str) -> PathBuf {
    Path::new(&shellexpand(data_dir)).join(CONFIG_FILE)
}

/// Read the global config file.
///
/// A missing file is an empty config. An unreadable or corrupt file is logged
/// and also treated as empty.
pub fn load_global(data_dir: &str) -> GlobalConfig {
    let path = config_path(data_dir);
    if !path.exists() {
        debug!("no global config at {}", path.display());
        return GlobalConfig::default();
    }

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str::<GlobalConfig>(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("could not read global config {}: {e}", path.display());
            GlobalConfig::default()
        }
    }
}

/// Merge `update` into the global config file, creating it if needed.
/// Returns the config as written.
pub fn save_global(data_dir: &str, update: &GlobalConfig) -> Result<GlobalConfig, RelayError> {
    let path = config_path(data_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let merged = load_global(data_dir).merge(update);
    let content = toml::to_string_pretty(&merged)
        .map_err(|e| RelayError::Config(format!("failed to serialize config: {e}")))?;
    std::fs::write(&path, content)?;

    info!("saved global config to {}", path.display());
    Ok(merged)
}

/// Read `SLACK_WEBHOOK_URL` from a `.env` file in `dir` without touching the
/// process environment.
pub fn read_local_webhook(dir: &Path) -> Option<String> {
    let iter = dotenvy::from_path_iter(dir.join(".env")).ok()?;
    iter.filter_map(Result::ok)
        .find(|(key, _)| key == WEBHOOK_ENV)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Only the literal `false` disables a toggle.
fn parse_toggle(value: &str) -> bool {
    value.trim() != "false"
}

/// Resolve the effective config from an environment lookup, the global file,
/// and the local `.env` webhook.
pub fn resolve<F>(
    env: F,
    global: &GlobalConfig,
    local_webhook: Option<String>,
    data_dir: &str,
) -> RelayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    RelayConfig {
        webhook_url: lookup(WEBHOOK_ENV)
            .or_else(|| global.webhook_url.clone())
            .or(local_webhook),
        session_id: lookup(SESSION_ENV).or_else(|| global.session_id.clone()),
        enable_progress: lookup(ENABLE_PROGRESS_ENV)
            .map(|v| parse_toggle(&v))
            .or(global.enable_progress)
            .unwrap_or_else(default_true),
        enable_compact_prompts: lookup(ENABLE_COMPACT_PROMPTS_ENV)
            .map(|v| parse_toggle(&v))
            .or(global.enable_compact_prompts)
            .unwrap_or_else(default_true),
        data_dir: data_dir.to_string(),
    }
}

/// Load the effective config from the real environment, the global file in
/// `data_dir`, and the `.env` in the current directory.
pub fn load(data_dir: &str) -> RelayConfig {
    let global = load_global(data_dir);
    let local_webhook = std::env::current_dir()
        .ok()
        .and_then(|cwd| read_local_webhook(&cwd));

    let cfg = resolve(|key| std::env::var(key).ok(), &global, local_webhook, data_dir);
    match cfg.webhook_url.as_deref() {
        Some(url) => info!("webhook configured: {}", redact_url(url)),
        None => info!("no webhook configured"),
    }
    cfg
}
