//! Deterministic classification of plan steps.

use crate::core::types::StepKind;

/// Classify a step by keywords in its name (case-insensitive).
///
/// - `Notes` if the name mentions `summar` or `note`.
/// - `Quiz` if the name mentions `quiz` or `question`.
/// - `Generic` otherwise. Notes keywords win over quiz keywords.
pub fn classify_step(name: &str) -> StepKind {
    let name = name.to_lowercase();
    if name.contains("summar") || name.contains("note") {
        StepKind::Notes
    } else if name.contains("quiz") || name.contains("question") {
        StepKind::Quiz
    } else {
        StepKind::Generic
    }
}
