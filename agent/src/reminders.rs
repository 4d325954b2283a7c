//! Reminder delivery and the background polling loop.
//!
//! Each tick reads the local clock as `HH:MM`, selects due reminders with
//! [`evaluate_with`], notifies once per due reminder and appends a single
//! `reminder_system` entry. The loop runs until its cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::core::evaluator::{IdleFallback, evaluate_with};
use crate::core::types::{Notification, Reminder};
use crate::io::config::AgentConfig;
use crate::io::interaction_log::{InteractionLog, LogRecord};
use crate::io::notifier::Notifier;

/// Source of the current `HH:MM` string.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Local wall-clock time as `HH:MM`.
pub fn local_clock() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Notifier+logger sink for due reminders.
pub struct ReminderDispatcher<N> {
    persona: String,
    notifier: N,
    log: InteractionLog,
    timeout_secs: u64,
    fallback: IdleFallback,
}

impl<N: Notifier> ReminderDispatcher<N> {
    pub fn new(config: &AgentConfig, notifier: N, log: InteractionLog) -> Self {
        Self {
            persona: config.persona.clone(),
            notifier,
            log,
            timeout_secs: config.reminders.notification_timeout_secs,
            fallback: config.reminders.idle_fallback(),
        }
    }

    pub fn notification_for(&self, reminder: &Reminder) -> Notification {
        Notification {
            title: format!("{}: {}", self.persona, reminder.name),
            message: reminder.message.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Notify once per due reminder, then append one `reminder_system` entry.
    ///
    /// A notification failure aborts delivery before the log entry is written.
    #[instrument(skip_all, fields(due = due.len()))]
    pub fn deliver(&self, due: &[Reminder]) -> Result<()> {
        for reminder in due {
            self.notifier
                .notify(&self.notification_for(reminder))
                .with_context(|| format!("notify reminder {}", reminder.name))?;
        }
        self.log.append(LogRecord::ReminderSystem {
            fired: due.to_vec(),
        })?;
        Ok(())
    }

    /// Evaluate `reminders` at `now` and deliver the due subset.
    pub fn check_now(&self, reminders: &[Reminder], now: &str) -> Result<Vec<Reminder>> {
        let due = evaluate_with(reminders, now, self.fallback);
        debug!(now, due = due.len(), "reminders evaluated");
        self.deliver(&due)?;
        Ok(due)
    }
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub failures: u64,
}

/// Handle to a running reminder loop.
pub struct ReminderLoop {
    cancel: CancellationToken,
    handle: JoinHandle<LoopStats>,
}

impl ReminderLoop {
    /// Spawn the loop on the current tokio runtime using the local clock.
    pub fn spawn<N: Notifier + 'static>(
        dispatcher: Arc<ReminderDispatcher<N>>,
        reminders: Arc<[Reminder]>,
        interval: Duration,
    ) -> Self {
        Self::spawn_with_clock(dispatcher, reminders, interval, Arc::new(local_clock))
    }

    pub fn spawn_with_clock<N: Notifier + 'static>(
        dispatcher: Arc<ReminderDispatcher<N>>,
        reminders: Arc<[Reminder]>,
        interval: Duration,
        clock: Clock,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            dispatcher,
            reminders,
            interval,
            clock,
            cancel.clone(),
        ));
        Self { cancel, handle }
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Signal the loop to stop and wait for it to exit.
    pub async fn stop(self) -> Result<LoopStats> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the loop to exit after its token was cancelled elsewhere.
    pub async fn join(self) -> Result<LoopStats> {
        self.handle
            .await
            .map_err(|err| anyhow!("reminder loop task failed: {err}"))
    }
}

async fn run_loop<N: Notifier + 'static>(
    dispatcher: Arc<ReminderDispatcher<N>>,
    reminders: Arc<[Reminder]>,
    interval: Duration,
    clock: Clock,
    cancel: CancellationToken,
) -> LoopStats {
    info!(
        interval_secs = interval.as_secs(),
        reminders = reminders.len(),
        "reminder loop started"
    );
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = LoopStats::default();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let now = clock();
        let tick_dispatcher = Arc::clone(&dispatcher);
        let tick_reminders = Arc::clone(&reminders);
        let outcome = tokio::task::spawn_blocking(move || {
            tick_dispatcher.check_now(&tick_reminders, &now)
        })
        .await;

        stats.ticks += 1;
        match outcome {
            Ok(Ok(fired)) => debug!(fired = fired.len(), "reminder tick complete"),
            Ok(Err(err)) => {
                stats.failures += 1;
                warn!(err = %format!("{err:#}"), "reminder tick failed");
            }
            Err(err) => {
                stats.failures += 1;
                warn!(err = %err, "reminder tick panicked");
            }
        }
    }

    info!(
        ticks = stats.ticks,
        failures = stats.failures,
        "reminder loop stopped"
    );
    stats
}
