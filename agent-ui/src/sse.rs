//! Server-Sent Events stream and log file watcher.

use std::convert::Infallible;
use std::path::Path;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use notify::{Event as NotifyEvent, EventKind, PollWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state::{AppState, ChangeEvent};

#[derive(Serialize)]
struct SsePayload<'a> {
    #[serde(rename = "type")]
    event_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<'a> From<&'a ChangeEvent> for SsePayload<'a> {
    fn from(event: &'a ChangeEvent) -> Self {
        match event {
            ChangeEvent::LogAppended => SsePayload {
                event_type: "log_appended",
                title: None,
                message: None,
            },
            ChangeEvent::ReminderFired { title, message } => SsePayload {
                event_type: "reminder_fired",
                title: Some(title),
                message: Some(message),
            },
        }
    }
}

fn to_sse_event(change: &ChangeEvent) -> Option<Event> {
    let payload = SsePayload::from(change);
    let json = serde_json::to_string(&payload).ok()?;
    Some(Event::default().event(payload.event_type).data(json))
}

/// SSE endpoint handler.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.event_tx.subscribe();
    let shutdown = state.shutdown.clone();

    let stream = async_stream::stream! {
        yield Ok(Event::default().event("connected").data("{}"));

        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = rx.recv() => received,
            };
            match received {
                Ok(change) => {
                    if let Some(event) = to_sse_event(&change) {
                        yield Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "SSE client lagged, some events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Start the log watcher in a background task until shutdown.
pub fn start_log_watcher(state: AppState) {
    let cancel = state.shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = run_log_watcher(state, cancel).await {
            warn!(error = %e, "log watcher failed");
        }
    });
}

async fn run_log_watcher(state: AppState, cancel: CancellationToken) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<NotifyEvent>(100);

    let mut watcher = PollWatcher::new(
        move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.try_send(event);
            }
        },
        notify::Config::default().with_poll_interval(Duration::from_millis(200)),
    )?;

    // The log may not exist yet; watch its directory so creation is seen.
    let state_dir = &state.paths.state_dir;
    std::fs::create_dir_all(state_dir)?;
    watcher.watch(state_dir, RecursiveMode::NonRecursive)?;
    info!(path = %state_dir.display(), "watching state directory");

    // Batch bursts of appends into one event per flush.
    let mut pending_events: Vec<NotifyEvent> = Vec::new();
    let mut flush_tick = tokio::time::interval(Duration::from_millis(200));
    flush_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(event) = rx.recv() => {
                pending_events.push(event);
            }
            _ = flush_tick.tick() => {
                if pending_events.is_empty() {
                    continue;
                }
                process_events(&state, &pending_events);
                pending_events.clear();
            }
        }
    }
    debug!("log watcher stopped");
    Ok(())
}

fn process_events(state: &AppState, events: &[NotifyEvent]) {
    if touches_log(&state.paths.log_path, events) {
        debug!("broadcasting log append");
        let _ = state.event_tx.send(ChangeEvent::LogAppended);
    }
}

fn touches_log(log_path: &Path, events: &[NotifyEvent]) -> bool {
    events
        .iter()
        .filter(|event| matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)))
        .flat_map(|event| event.paths.iter())
        .any(|path| path == log_path)
}
