//! Deterministic selection of due reminders.

use crate::core::types::{Reminder, ReminderTime};

/// What to return when no reminder matched the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleFallback {
    /// Treat every reminder as due. Matches the shipped behavior.
    #[default]
    FireAll,
    /// Return nothing.
    FireNone,
}

impl IdleFallback {
    pub fn from_fire_all(fire_all: bool) -> Self {
        if fire_all {
            IdleFallback::FireAll
        } else {
            IdleFallback::FireNone
        }
    }
}

/// Select due reminders using the default [`IdleFallback`].
pub fn evaluate(reminders: &[Reminder], now: &str) -> Vec<Reminder> {
    evaluate_with(reminders, now, IdleFallback::default())
}

/// Select the reminders due at `now` (`HH:MM`), preserving input order.
///
/// A reminder is due when it is recurring or its literal time equals `now`
/// as a string. There is no range matching: a tick that does not land on
/// the exact minute skips the reminder.
pub fn evaluate_with(reminders: &[Reminder], now: &str, fallback: IdleFallback) -> Vec<Reminder> {
    let due: Vec<Reminder> = reminders
        .iter()
        .filter(|reminder| is_due(reminder, now))
        .cloned()
        .collect();
    if !due.is_empty() {
        return due;
    }
    match fallback {
        IdleFallback::FireAll => reminders.to_vec(),
        IdleFallback::FireNone => Vec::new(),
    }
}

fn is_due(reminder: &Reminder, now: &str) -> bool {
    match &reminder.time {
        ReminderTime::Recurring => true,
        ReminderTime::At(clock) => clock == now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schedule::default_reminders;

    fn meals() -> Vec<Reminder> {
        vec![
            Reminder::new("Breakfast", "09:00", "eat"),
            Reminder::new("Lunch", "13:00", "eat"),
        ]
    }

    #[test]
    fn literal_match_and_sentinel_are_both_due() {
        let reminders = vec![
            Reminder::new("Breakfast", "09:00", "eat"),
            Reminder::new("Water", "every_2h", "sip"),
        ];
        let due = evaluate(&reminders, "09:00");
        assert_eq!(due, reminders);
    }

    #[test]
    fn sentinel_alone_is_due_off_the_hour() {
        let due = evaluate(&default_reminders(), "10:17");
        let names: Vec<&str> = due.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Drink Water"]);
    }

    #[test]
    fn exact_match_only() {
        let due = evaluate_with(&meals(), "09:01", IdleFallback::FireNone);
        assert!(due.is_empty());
        let due = evaluate_with(&meals(), "13:00", IdleFallback::FireNone);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "Lunch");
    }

    #[test]
    fn nothing_matched_fires_everything_by_default() {
        let reminders = meals();
        for now in ["00:00", "08:59", "12:30", "23:59"] {
            assert_eq!(evaluate(&reminders, now), reminders);
        }
    }

    #[test]
    fn fire_none_policy_returns_empty() {
        assert!(evaluate_with(&meals(), "07:45", IdleFallback::FireNone).is_empty());
    }

    #[test]
    fn matched_entry_always_included() {
        let reminders = default_reminders();
        for reminder in reminders.iter().filter(|r| !r.time.is_recurring()) {
            let due = evaluate(&reminders, reminder.time.as_str());
            assert!(due.contains(reminder));
        }
    }

    #[test]
    fn empty_table_yields_empty() {
        assert!(evaluate(&[], "09:00").is_empty());
    }
}
