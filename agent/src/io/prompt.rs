//! Prompt rendering for the planner and executor.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::types::{PlanStep, StepKind};
use crate::io::model::ChatRequest;

const PLANNER_SYSTEM_TEMPLATE: &str = include_str!("prompts/planner_system.md");
const PLANNER_USER_TEMPLATE: &str = include_str!("prompts/planner_user.md");
const EXECUTOR_SYSTEM_TEMPLATE: &str = include_str!("prompts/executor_system.md");
const NOTES_TEMPLATE: &str = include_str!("prompts/notes.md");
const QUIZ_TEMPLATE: &str = include_str!("prompts/quiz.md");
const GENERIC_TEMPLATE: &str = include_str!("prompts/generic.md");

/// Builds chat requests from compiled-in templates.
pub struct PromptBuilder {
    env: Environment<'static>,
    persona: String,
}

impl PromptBuilder {
    pub fn new(persona: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            ("planner_system", PLANNER_SYSTEM_TEMPLATE),
            ("planner_user", PLANNER_USER_TEMPLATE),
            ("executor_system", EXECUTOR_SYSTEM_TEMPLATE),
            ("notes", NOTES_TEMPLATE),
            ("quiz", QUIZ_TEMPLATE),
            ("generic", GENERIC_TEMPLATE),
        ] {
            env.add_template(name, source)
                .with_context(|| format!("load prompt template {name}"))?;
        }
        Ok(Self {
            env,
            persona: persona.into(),
        })
    }

    pub fn planner(&self, task: &str) -> Result<ChatRequest> {
        Ok(ChatRequest {
            system: Some(self.render("planner_system", context! { persona => &self.persona })?),
            user: self.render("planner_user", context! { task => task.trim() })?,
            max_tokens: 400,
            temperature: Some(0.2),
        })
    }

    pub fn executor(&self, kind: StepKind, step: &PlanStep, source: &str) -> Result<ChatRequest> {
        let source = source.trim();
        let request = match kind {
            StepKind::Notes => ChatRequest {
                system: Some(self.executor_system()?),
                user: self.render("notes", context! { source })?,
                max_tokens: 300,
                temperature: Some(0.3),
            },
            StepKind::Quiz => ChatRequest {
                system: Some(self.executor_system()?),
                user: self.render("quiz", context! { source })?,
                max_tokens: 600,
                temperature: Some(0.4),
            },
            StepKind::Generic => ChatRequest {
                system: None,
                user: self.render("generic", context! { desc => &step.desc, source })?,
                max_tokens: 400,
                temperature: None,
            },
        };
        Ok(request)
    }

    fn executor_system(&self) -> Result<String> {
        self.render("executor_system", context! { persona => &self.persona })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        let template = self.env.get_template(name)?;
        template
            .render(ctx)
            .with_context(|| format!("render prompt {name}"))
    }
}
