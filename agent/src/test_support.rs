//! Test-only doubles for the model and notification ports.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tempfile::TempDir;

use crate::core::types::Notification;
use crate::io::config::{AgentConfig, NotifierKind, write_config};
use crate::io::init::AgentPaths;
use crate::io::interaction_log::InteractionLog;
use crate::io::model::{ChatModel, ChatRequest};
use crate::io::notifier::Notifier;

/// Chat model that replays queued replies in order and records requests.
///
/// Once the queue is empty every call fails.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model whose first call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(message.to_string())])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.requests
            .lock()
            .map_err(|_| anyhow!("requests lock poisoned"))?
            .push(request.clone());
        let next = self
            .replies
            .lock()
            .map_err(|_| anyhow!("replies lock poisoned"))?
            .pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted model has no replies left")),
        }
    }
}

/// Notifier that records every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow!("notifier lock poisoned"))?
            .push(notification.clone());
        Ok(())
    }
}

/// Notifier that always fails, as a headless desktop would.
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _notification: &Notification) -> Result<()> {
        Err(anyhow!("no notification daemon"))
    }
}

/// A throwaway project directory with `.mom/config.toml` using the log notifier.
pub struct TestProject {
    temp: TempDir,
    pub paths: AgentPaths,
    pub config: AgentConfig,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let paths = AgentPaths::new(temp.path());
        let mut config = AgentConfig::default();
        config.reminders.notifier = NotifierKind::Log;
        write_config(&paths.config_path, &config)?;
        Ok(Self {
            temp,
            paths,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn log(&self) -> InteractionLog {
        InteractionLog::new(&self.paths.log_path)
    }

    /// Raw lines currently in the interaction log.
    pub fn log_lines(&self) -> Result<Vec<String>> {
        if !self.paths.log_path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.paths.log_path)?;
        Ok(contents.lines().map(str::to_string).collect())
    }
}
