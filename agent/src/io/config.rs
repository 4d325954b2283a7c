//! Agent configuration stored under `.mom/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::evaluator::IdleFallback;

/// Where model-backed content comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Canned plans and outputs; no network, no credential.
    #[default]
    Mock,
    /// Chat-completions API calls.
    Live,
}

/// How reminders are delivered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Desktop notification via an external program (`notify-send`).
    #[default]
    Desktop,
    /// Diagnostics only, for headless machines.
    Log,
}

/// Agent configuration (TOML).
///
/// Missing fields default to the values the agent ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub mode: Mode,

    /// Persona used in prompts and notification titles.
    pub persona: String,

    pub model: ModelConfig,

    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// API root, without the `/v1/...` suffix.
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key (live mode only).
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReminderConfig {
    /// Polling interval of the background loop.
    pub interval_secs: u64,
    /// Display timeout passed to the notification sink.
    pub notification_timeout_secs: u64,
    /// Fire every reminder on ticks where nothing matched.
    pub fire_all_when_idle: bool,
    pub notifier: NotifierKind,
    /// Program used by the desktop notifier.
    pub notifier_program: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Mock,
            persona: "Mom Agent".to_string(),
            model: ModelConfig::default(),
            reminders: ReminderConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            notification_timeout_secs: 10,
            fire_all_when_idle: true,
            notifier: NotifierKind::Desktop,
            notifier_program: "notify-send".to_string(),
        }
    }
}

impl ReminderConfig {
    pub fn idle_fallback(&self) -> IdleFallback {
        IdleFallback::from_fire_all(self.fire_all_when_idle)
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.persona.trim().is_empty() {
            return Err(anyhow!("persona must be non-empty"));
        }
        if self.model.model.trim().is_empty() {
            return Err(anyhow!("model.model must be non-empty"));
        }
        if self.model.api_key_env.trim().is_empty() {
            return Err(anyhow!("model.api_key_env must be non-empty"));
        }
        if self.model.request_timeout_secs == 0 {
            return Err(anyhow!("model.request_timeout_secs must be > 0"));
        }
        if !self.model.base_url.starts_with("http://") && !self.model.base_url.starts_with("https://")
        {
            return Err(anyhow!("model.base_url must be an http(s) URL"));
        }
        if self.reminders.interval_secs == 0 {
            return Err(anyhow!("reminders.interval_secs must be > 0"));
        }
        if self.reminders.notifier == NotifierKind::Desktop
            && self.reminders.notifier_program.trim().is_empty()
        {
            return Err(anyhow!(
                "reminders.notifier_program must be set for the desktop notifier"
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AgentConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if !path.exists() {
        let cfg = AgentConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AgentConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
