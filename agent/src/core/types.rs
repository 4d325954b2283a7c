//! Shared deterministic types for the agent core.
//!
//! These types define the stable shapes written to the interaction log and
//! returned by the web API. They must not depend on external state or I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `time` value that marks a reminder as firing on every tick.
pub const RECURRING_SENTINEL: &str = "every_2h";

/// When a reminder is scheduled to fire.
///
/// Serialized as its string form (`"09:00"` or `"every_2h"`) so log records
/// keep the `{name, time, message}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReminderTime {
    /// Literal wall-clock time, compared as an `HH:MM` string.
    At(String),
    /// Fires on every polling tick.
    Recurring,
}

impl ReminderTime {
    pub fn as_str(&self) -> &str {
        match self {
            ReminderTime::At(clock) => clock,
            ReminderTime::Recurring => RECURRING_SENTINEL,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, ReminderTime::Recurring)
    }
}

impl From<String> for ReminderTime {
    fn from(value: String) -> Self {
        if value == RECURRING_SENTINEL {
            ReminderTime::Recurring
        } else {
            ReminderTime::At(value)
        }
    }
}

impl From<&str> for ReminderTime {
    fn from(value: &str) -> Self {
        ReminderTime::from(value.to_string())
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A static reminder definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub name: String,
    pub time: ReminderTime,
    pub message: String,
}

impl Reminder {
    pub fn new(name: &str, time: impl Into<ReminderTime>, message: &str) -> Self {
        Self {
            name: name.to_string(),
            time: time.into(),
            message: message.to_string(),
        }
    }
}

/// One step of a study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: i64,
    pub name: String,
    pub desc: String,
}

impl PlanStep {
    pub fn new(id: i64, name: &str, desc: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            desc: desc.to_string(),
        }
    }
}

/// Kind of output a plan step produces, derived from the step name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Notes,
    Quiz,
    Generic,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Notes => "notes",
            StepKind::Quiz => "quiz",
            StepKind::Generic => "generic",
        }
    }
}

/// Output of executing a single plan step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub content: String,
}

/// A desktop notification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub timeout_secs: u64,
}
