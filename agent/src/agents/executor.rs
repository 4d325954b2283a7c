//! Executor agent that turns one plan step into notes, a quiz, or free text.

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::canned::mock_output;
use crate::core::classifier::classify_step;
use crate::core::types::{PlanStep, StepResult};
use crate::io::interaction_log::{InteractionLog, LogRecord};
use crate::io::model::{Backend, ChatModel};
use crate::io::prompt::PromptBuilder;

/// Executor agent that owns the step prompt templates.
pub struct ExecutorAgent {
    prompts: PromptBuilder,
}

impl ExecutorAgent {
    pub fn new(persona: &str) -> Result<Self> {
        Ok(Self {
            prompts: PromptBuilder::new(persona)?,
        })
    }

    /// Execute `step` against `source` and append one `executor` log entry.
    #[instrument(skip_all, fields(step = %step.name, mock = backend.is_mock()))]
    pub async fn execute<M: ChatModel>(
        &self,
        backend: &Backend<M>,
        log: &InteractionLog,
        step: &PlanStep,
        source: &str,
    ) -> Result<StepResult> {
        let kind = classify_step(&step.name);
        let content = match backend {
            Backend::Mock => mock_output(kind).to_string(),
            Backend::Live(model) => {
                let request = self.prompts.executor(kind, step, source)?;
                model
                    .complete(&request)
                    .await
                    .with_context(|| format!("execute step {}", step.id))?
                    .trim()
                    .to_string()
            }
        };
        debug!(kind = kind.as_str(), chars = content.len(), "step executed");

        log.append(LogRecord::Executor {
            step: step.clone(),
            output_type: kind,
            output: content.clone(),
        })?;
        Ok(StepResult { kind, content })
    }
}
