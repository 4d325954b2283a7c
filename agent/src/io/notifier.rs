//! Notification sinks for reminder delivery.
//!
//! The [`Notifier`] trait decouples reminder delivery from the desktop
//! notification mechanism. Tests use recording notifiers that never spawn
//! processes.

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, instrument};

use crate::core::types::Notification;
use crate::io::config::{AgentConfig, NotifierKind};
use crate::io::process::run_command_with_timeout;

/// Upper bound on how long the notification program may run.
const NOTIFY_PROCESS_TIMEOUT: Duration = Duration::from_secs(5);
const NOTIFY_OUTPUT_LIMIT_BYTES: usize = 4096;

/// Abstraction over notification delivery.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, notification: &Notification) -> Result<()> {
        (**self).notify(notification)
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: &Notification) -> Result<()> {
        (**self).notify(notification)
    }
}

/// Desktop notifier that spawns a `notify-send` compatible program.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    app_name: String,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            app_name: app_name.into(),
        }
    }

    fn command(&self, notification: &Notification) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!(
            "--expire-time={}",
            notification.timeout_secs.saturating_mul(1000)
        ))
        .arg(format!("--app-name={}", self.app_name))
        .arg(&notification.title)
        .arg(&notification.message);
        cmd
    }
}

impl Notifier for CommandNotifier {
    #[instrument(skip_all, fields(program = %self.program, title = %notification.title))]
    fn notify(&self, notification: &Notification) -> Result<()> {
        let output = run_command_with_timeout(
            self.command(notification),
            NOTIFY_PROCESS_TIMEOUT,
            NOTIFY_OUTPUT_LIMIT_BYTES,
        )
        .map_err(|err| anyhow!("run {}: {err:#}", self.program))?;
        if output.timed_out {
            return Err(anyhow!(
                "{} timed out after {:?}",
                self.program,
                NOTIFY_PROCESS_TIMEOUT
            ));
        }
        if !output.success() {
            return Err(anyhow!(
                "{} failed with status {:?}: {}",
                self.program,
                output.status.code(),
                output.stderr_lossy()
            ));
        }
        debug!("desktop notification sent");
        Ok(())
    }
}

/// Notifier that only emits a tracing event.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            title = %notification.title,
            message = %notification.message,
            timeout_secs = notification.timeout_secs,
            "reminder"
        );
        Ok(())
    }
}

/// Delivers each notification to every inner sink in order.
///
/// Stops at the first failing sink.
#[derive(Default)]
pub struct FanoutNotifier {
    sinks: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl Notifier + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        for sink in &self.sinks {
            sink.notify(notification)?;
        }
        Ok(())
    }
}

/// Build the notifier selected by `config.reminders.notifier`.
pub fn notifier_from_config(config: &AgentConfig) -> Box<dyn Notifier> {
    match config.reminders.notifier {
        NotifierKind::Desktop => Box::new(CommandNotifier::new(
            config.reminders.notifier_program.clone(),
            config.persona.clone(),
        )),
        NotifierKind::Log => Box::new(TracingNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn sample() -> Notification {
        Notification {
            title: "Mom Agent: Lunch".to_string(),
            message: "Lunch time".to_string(),
            timeout_secs: 10,
        }
    }

    #[derive(Default)]
    struct Counting {
        seen: Mutex<Vec<String>>,
    }

    impl Notifier for Counting {
        fn notify(&self, notification: &Notification) -> Result<()> {
            self.seen
                .lock()
                .map_err(|_| anyhow!("poisoned"))?
                .push(notification.title.clone());
            Ok(())
        }
    }

    struct Failing;

    impl Notifier for Failing {
        fn notify(&self, _notification: &Notification) -> Result<()> {
            Err(anyhow!("no display"))
        }
    }

    #[test]
    fn command_line_carries_timeout_and_title() {
        let notifier = CommandNotifier::new("notify-send", "Mom Agent");
        let cmd = notifier.command(&sample());
        let args: Vec<String> = cmd
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--expire-time=10000",
                "--app-name=Mom Agent",
                "Mom Agent: Lunch",
                "Lunch time",
            ]
        );
    }

    #[test]
    fn missing_program_is_an_error() {
        let notifier = CommandNotifier::new("definitely-not-a-notifier-binary", "Mom Agent");
        assert!(notifier.notify(&sample()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_reports_status() {
        let notifier = CommandNotifier::new("false", "Mom Agent");
        let err = notifier.notify(&sample()).unwrap_err();
        assert!(err.to_string().contains("failed with status"));
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let first = Arc::new(Counting::default());
        let second = Arc::new(Counting::default());
        let fanout = FanoutNotifier::new()
            .with(first.clone())
            .with(TracingNotifier)
            .with(second.clone());
        fanout.notify(&sample()).expect("notify");
        assert_eq!(first.seen.lock().expect("lock").len(), 1);
        assert_eq!(second.seen.lock().expect("lock").len(), 1);
    }

    #[test]
    fn fanout_propagates_failure() {
        let after = Arc::new(Counting::default());
        let fanout = FanoutNotifier::new().with(Failing).with(after.clone());
        assert!(fanout.notify(&sample()).is_err());
        assert!(after.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn log_notifier_selected_from_config() {
        let mut config = AgentConfig::default();
        config.reminders.notifier = NotifierKind::Log;
        notifier_from_config(&config)
            .notify(&sample())
            .expect("log notifier never fails");
    }
}
