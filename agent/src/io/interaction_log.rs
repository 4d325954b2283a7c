//! Append-only interaction log (`.mom/logs.jsonl`).
//!
//! One JSON object per line: `{"role": .., ..payload, "timestamp": ..}`.
//! Appends open the file in append mode and write each line with a single
//! `write_all`, relying on the OS append guarantee; there is no locking.
//! Readers must therefore tolerate a partially written trailing line.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::core::types::{PlanStep, Reminder, StepKind};

/// Role-specific payload of a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum LogRecord {
    Planner {
        input: String,
        plan: Vec<PlanStep>,
    },
    Executor {
        step: PlanStep,
        output_type: StepKind,
        output: String,
    },
    ReminderSystem {
        fired: Vec<Reminder>,
    },
}

impl LogRecord {
    pub fn role(&self) -> &'static str {
        match self {
            LogRecord::Planner { .. } => "planner",
            LogRecord::Executor { .. } => "executor",
            LogRecord::ReminderSystem { .. } => "reminder_system",
        }
    }
}

/// A record stamped at append time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(flatten)]
    pub record: LogRecord,
    pub timestamp: String,
}

/// Handle to the interaction log file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    path: PathBuf,
}

impl InteractionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamp `record` with the current UTC time and append it as one line.
    #[instrument(skip_all, fields(role = record.role(), path = %self.path.display()))]
    pub fn append(&self, record: LogRecord) -> Result<LogEntry> {
        let entry = LogEntry {
            record,
            timestamp: utc_timestamp(),
        };
        let mut line = serde_json::to_string(&entry).context("serialize log entry")?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create log dir {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("append log {}", self.path.display()))?;
        debug!(bytes = line.len(), "appended log entry");
        Ok(entry)
    }

    /// Read up to `limit` most recent complete entries.
    pub fn read_recent(&self, limit: usize) -> Result<Vec<Value>> {
        read_recent(&self.path, limit)
    }
}

/// ISO-8601 UTC timestamp with microseconds and a `Z` suffix.
pub fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Read up to `limit` most recent entries from `path`.
///
/// A missing file yields no entries. A final line without a trailing newline
/// is treated as an append in progress and ignored. Lines that are not JSON
/// objects are skipped.
pub fn read_recent(path: &Path, limit: usize) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path).with_context(|| format!("read log {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let complete = match text.rfind('\n') {
        Some(end) => &text[..end],
        None => "",
    };

    let mut entries: Vec<Value> = Vec::new();
    for (index, line) in complete.split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) if value.is_object() => entries.push(value),
            Ok(_) => warn!(line = index + 1, "skipping non-object log line"),
            Err(err) => warn!(line = index + 1, err = %err, "skipping malformed log line"),
        }
    }

    let skip = entries.len().saturating_sub(limit);
    Ok(entries.split_off(skip))
}
