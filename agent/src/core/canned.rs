//! Canned plans and outputs used in mock mode and as parse fallbacks.

use crate::core::types::{PlanStep, StepKind};

pub const MOCK_NOTES: &str = "- Point 1\n- Point 2\n- Point 3\n- Point 4\n- Point 5";

pub const MOCK_QUIZ: &str = "Q1: Mock question?\nA. Option1 B. Option2 C. Option3 D. Option4\nAnswer: A\n\
Q2: Mock question?\nA. Option1 B. Option2 C. Option3 D. Option4\nAnswer: B\n\
Q3: Mock question?\nA. Option1 B. Option2 C. Option3 D. Option4\nAnswer: C\n\
Q4: Mock question?\nA. Option1 B. Option2 C. Option3 D. Option4\nAnswer: D\n\
Q5: Mock question?\nA. Option1 B. Option2 C. Option3 D. Option4\nAnswer: A";

pub const MOCK_GENERIC: &str = "[MOCK EXECUTION OUTPUT]";

/// Plan returned in mock mode.
pub fn mock_plan() -> Vec<PlanStep> {
    vec![
        PlanStep::new(1, "Summarize", "Create short notes (mocked)."),
        PlanStep::new(2, "Create Quiz", "Generate 5 short quiz questions (mocked)."),
    ]
}

/// Plan substituted when a model response cannot be parsed.
pub fn fallback_plan() -> Vec<PlanStep> {
    vec![
        PlanStep::new(1, "Summarize", "Create short notes (fallback)."),
        PlanStep::new(2, "Create Quiz", "Make 5 short quiz questions (fallback)."),
    ]
}

pub fn mock_output(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Notes => MOCK_NOTES,
        StepKind::Quiz => MOCK_QUIZ,
        StepKind::Generic => MOCK_GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_quiz_has_five_questions() {
        assert_eq!(MOCK_QUIZ.matches("Answer:").count(), 5);
        assert!(MOCK_QUIZ.starts_with("Q1:"));
        assert!(MOCK_QUIZ.ends_with("Answer: A"));
    }

    #[test]
    fn plans_differ_only_in_descriptions() {
        let mock = mock_plan();
        let fallback = fallback_plan();
        assert_eq!(mock.len(), fallback.len());
        for (a, b) in mock.iter().zip(&fallback) {
            assert_eq!((a.id, &a.name), (b.id, &b.name));
            assert_ne!(a.desc, b.desc);
        }
    }
}
