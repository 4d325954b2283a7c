//! Study pipeline: plan a task, then execute every step against the source.

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, instrument};

use crate::agents::executor::ExecutorAgent;
use crate::agents::planner::PlannerAgent;
use crate::core::types::{PlanStep, StepResult};
use crate::io::config::AgentConfig;
use crate::io::interaction_log::InteractionLog;
use crate::io::model::{Backend, ChatModel};

/// One executed plan step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutput {
    pub step: PlanStep,
    pub result: StepResult,
}

/// Plan plus the output of each step, in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyResult {
    pub plan: Vec<PlanStep>,
    pub outputs: Vec<StepOutput>,
}

/// The source text was empty or whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySourceError;

impl fmt::Display for EmptySourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("paste some text to study first")
    }
}

impl std::error::Error for EmptySourceError {}

/// Planner and executor bound to one backend and log.
pub struct StudySession<M> {
    backend: Backend<M>,
    log: InteractionLog,
    planner: PlannerAgent,
    executor: ExecutorAgent,
}

impl<M: ChatModel> StudySession<M> {
    pub fn new(config: &AgentConfig, backend: Backend<M>, log: InteractionLog) -> Result<Self> {
        Ok(Self {
            backend,
            log,
            planner: PlannerAgent::new(&config.persona)?,
            executor: ExecutorAgent::new(&config.persona)?,
        })
    }

    pub fn backend(&self) -> &Backend<M> {
        &self.backend
    }

    pub async fn plan(&self, task: &str) -> Result<Vec<PlanStep>> {
        self.planner.plan(&self.backend, &self.log, task).await
    }

    pub async fn execute(&self, step: &PlanStep, source: &str) -> Result<StepResult> {
        self.executor
            .execute(&self.backend, &self.log, step, source)
            .await
    }

    /// Plan notes and a quiz for `text`, then run each step in order.
    ///
    /// Stops at the first failing step; entries already appended stay in the log.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn run(&self, text: &str) -> Result<StudyResult> {
        if text.trim().is_empty() {
            return Err(EmptySourceError.into());
        }
        let plan = self
            .plan(&format!("Create notes & quiz for: {text}"))
            .await?;

        let mut outputs = Vec::with_capacity(plan.len());
        for step in &plan {
            let result = self.execute(step, text).await?;
            outputs.push(StepOutput {
                step: step.clone(),
                result,
            });
        }
        info!(steps = outputs.len(), "study pipeline finished");
        Ok(StudyResult { plan, outputs })
    }
}
