//! Planner agent producing a short study plan.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use jsonschema::{Draft, Validator};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::core::canned::{fallback_plan, mock_plan};
use crate::core::types::PlanStep;
use crate::io::interaction_log::{InteractionLog, LogRecord};
use crate::io::model::{Backend, ChatModel};
use crate::io::prompt::PromptBuilder;

const PLAN_SCHEMA: &str = include_str!("../../schemas/plan.schema.json");

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*\n(.*?)\n?\s*```$").expect("code fence regex is valid")
});

/// Planner agent that owns the plan schema and prompt templates.
pub struct PlannerAgent {
    prompts: PromptBuilder,
    schema: Validator,
}

impl PlannerAgent {
    pub fn new(persona: &str) -> Result<Self> {
        let schema_json: Value = serde_json::from_str(PLAN_SCHEMA).context("parse plan schema")?;
        let schema = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema_json)
            .context("compile plan schema")?;
        Ok(Self {
            prompts: PromptBuilder::new(persona)?,
            schema,
        })
    }

    /// Produce a plan for `task` and append one `planner` log entry.
    ///
    /// Model output that is not a valid plan is replaced by the fallback
    /// plan; only transport and log errors propagate.
    #[instrument(skip_all, fields(mock = backend.is_mock()))]
    pub async fn plan<M: ChatModel>(
        &self,
        backend: &Backend<M>,
        log: &InteractionLog,
        task: &str,
    ) -> Result<Vec<PlanStep>> {
        let plan = match backend {
            Backend::Mock => mock_plan(),
            Backend::Live(model) => {
                let request = self.prompts.planner(task)?;
                let content = model.complete(&request).await.context("planner request")?;
                match self.parse_plan(&content) {
                    Ok(plan) => plan,
                    Err(err) => {
                        warn!(err = %format!("{err:#}"), "unusable plan from model, using fallback");
                        fallback_plan()
                    }
                }
            }
        };
        debug!(steps = plan.len(), "plan ready");

        log.append(LogRecord::Planner {
            input: task.to_string(),
            plan: plan.clone(),
        })?;
        Ok(plan)
    }

    /// Parse model output as a plan: optional code fence, then a
    /// schema-conformant JSON array of steps.
    pub fn parse_plan(&self, content: &str) -> Result<Vec<PlanStep>> {
        let body = strip_code_fence(content.trim());
        let value: Value = serde_json::from_str(body).context("plan is not JSON")?;
        let messages: Vec<String> = self
            .schema
            .iter_errors(&value)
            .map(|err| err.to_string())
            .collect();
        if !messages.is_empty() {
            bail!("plan schema validation failed:\n- {}", messages.join("\n- "));
        }
        serde_json::from_value(value).context("parse plan steps")
    }
}

fn strip_code_fence(content: &str) -> &str {
    match CODE_FENCE_RE.captures(content).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => content,
    }
}
