//! Compiled-in reminder table.

use crate::core::types::{RECURRING_SENTINEL, Reminder};

/// The fixed reminder table shipped with the agent.
pub fn default_reminders() -> Vec<Reminder> {
    vec![
        Reminder::new("Breakfast", "09:00", "Breakfast time! Fuel up, baby."),
        Reminder::new("Lunch", "13:00", "Lunch time — don't skip it."),
        Reminder::new("Dinner", "20:00", "Dinner time — eat well."),
        Reminder::new(
            "Drink Water",
            RECURRING_SENTINEL,
            "Time to drink water — sip some now!",
        ),
    ]
}
