//! Shared application state for the UI server.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use mom_agent::core::schedule::default_reminders;
use mom_agent::core::types::{Notification, Reminder};
use mom_agent::io::config::AgentConfig;
use mom_agent::io::init::AgentPaths;
use mom_agent::io::interaction_log::InteractionLog;
use mom_agent::io::model::{Backend, OpenAiChat};
use mom_agent::io::notifier::{FanoutNotifier, Notifier, notifier_from_config};
use mom_agent::reminders::ReminderDispatcher;
use mom_agent::study::StudySession;

/// Events broadcast to SSE clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// `logs.jsonl` grew.
    LogAppended,
    /// A reminder notification was delivered.
    ReminderFired { title: String, message: String },
}

/// Forwards reminder notifications to connected SSE clients.
pub struct BroadcastNotifier {
    tx: Arc<broadcast::Sender<ChangeEvent>>,
}

impl BroadcastNotifier {
    pub fn new(tx: Arc<broadcast::Sender<ChangeEvent>>) -> Self {
        Self { tx }
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        let delivered = self
            .tx
            .send(ChangeEvent::ReminderFired {
                title: notification.title.clone(),
                message: notification.message.clone(),
            })
            .unwrap_or(0);
        debug!(clients = delivered, "reminder broadcast");
        Ok(())
    }
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AgentPaths>,
    pub study: Arc<StudySession<OpenAiChat>>,
    pub dispatcher: Arc<ReminderDispatcher<FanoutNotifier>>,
    pub reminders: Arc<[Reminder]>,
    /// Broadcast sender for log and reminder events.
    pub event_tx: Arc<broadcast::Sender<ChangeEvent>>,
    /// Cancelled on server shutdown; ends SSE streams and the log watcher.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(paths: AgentPaths, config: &AgentConfig, backend: Backend<OpenAiChat>) -> Result<Self> {
        Self::with_notifier(paths, config, backend, notifier_from_config(config))
    }

    /// Build state whose reminders go to SSE clients and `notifier`.
    pub fn with_notifier(
        paths: AgentPaths,
        config: &AgentConfig,
        backend: Backend<OpenAiChat>,
        notifier: impl Notifier + 'static,
    ) -> Result<Self> {
        let (event_tx, _) = broadcast::channel(64);
        let event_tx = Arc::new(event_tx);
        let log = InteractionLog::new(&paths.log_path);

        let fanout = FanoutNotifier::new()
            .with(BroadcastNotifier::new(Arc::clone(&event_tx)))
            .with(notifier);
        let dispatcher = ReminderDispatcher::new(config, fanout, log.clone());
        let study = StudySession::new(config, backend, log)?;

        Ok(Self {
            paths: Arc::new(paths),
            study: Arc::new(study),
            dispatcher: Arc::new(dispatcher),
            reminders: default_reminders().into(),
            event_tx,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn log(&self) -> InteractionLog {
        InteractionLog::new(&self.paths.log_path)
    }
}
