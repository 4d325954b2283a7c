//! Chat-model abstraction and the OpenAI-compatible client.
//!
//! The [`ChatModel`] trait decouples the planner and executor from the model
//! backend. [`Backend`] carries the mock/live choice made from configuration;
//! tests use scripted models that return predetermined text.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::io::config::{AgentConfig, Mode, ModelConfig};

/// One system/user prompt exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// Abstraction over chat-completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Return the assistant's reply text for `request`.
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Model-backed content source, chosen once from configuration.
#[derive(Debug)]
pub enum Backend<M> {
    /// Canned content; the model is never called.
    Mock,
    Live(M),
}

impl<M> Backend<M> {
    pub fn is_mock(&self) -> bool {
        matches!(self, Backend::Mock)
    }
}

impl Backend<OpenAiChat> {
    /// Build the backend selected by `config.mode`, reading the API key from
    /// the process environment.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Self::from_config_with(config, |name| std::env::var(name).ok())
    }

    /// Like [`Backend::from_config`] with an explicit variable lookup.
    ///
    /// Live mode without a non-empty credential fails with
    /// [`MissingCredentialError`].
    pub fn from_config_with<F>(config: &AgentConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match config.mode {
            Mode::Mock => {
                info!("using mock model backend");
                Ok(Backend::Mock)
            }
            Mode::Live => {
                let var = config.model.api_key_env.as_str();
                let api_key = lookup(var)
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| MissingCredentialError {
                        var: var.to_string(),
                    })?;
                info!(model = %config.model.model, "using live model backend");
                Ok(Backend::Live(OpenAiChat::new(api_key, &config.model)?))
            }
        }
    }
}

/// Live mode was selected but the API key variable is unset or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCredentialError {
    pub var: String,
}

impl fmt::Display for MissingCredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set the {} environment variable before running in live mode",
            self.var
        )
    }
}

impl std::error::Error for MissingCredentialError {}

/// Client for `POST {base_url}/v1/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiChat {
    pub fn new(api_key: String, config: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = build_completion_body(&self.model, request);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("send request to {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "chat completion failed");
            return Err(anyhow!("chat completion http {status}: {text}"));
        }

        let value: Value = response
            .json()
            .await
            .context("parse chat completion response")?;
        let content = extract_content(&value)?;
        debug!(chars = content.len(), "chat completion received");
        Ok(content)
    }
}

/// Build the JSON body for a chat-completions request.
pub fn build_completion_body(model: &str, request: &ChatRequest) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": request.user}));

    let mut body = json!({
        "model": model,
        "messages": messages,
        "max_tokens": request.max_tokens,
    });
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

/// Pull `choices[0].message.content` out of a response, trimmed.
pub fn extract_content(response: &Value) -> Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| anyhow!("chat completion response has no message content"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_config() -> AgentConfig {
        AgentConfig {
            mode: Mode::Live,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn mock_mode_needs_no_credential() {
        let backend = Backend::from_config_with(&AgentConfig::default(), |_| None).expect("mock");
        assert!(backend.is_mock());
    }

    #[test]
    fn live_mode_without_credential_is_fatal() {
        let err = Backend::from_config_with(&live_config(), |_| None).unwrap_err();
        let missing = err
            .downcast_ref::<MissingCredentialError>()
            .expect("typed error");
        assert_eq!(missing.var, "OPENAI_API_KEY");
    }

    #[test]
    fn live_mode_rejects_blank_credential() {
        let err = Backend::from_config_with(&live_config(), |_| Some("  ".to_string())).unwrap_err();
        assert!(err.downcast_ref::<MissingCredentialError>().is_some());
    }

    #[test]
    fn live_mode_reads_configured_variable() {
        let mut config = live_config();
        config.model.api_key_env = "STUDY_KEY".to_string();
        config.model.base_url = "http://localhost:9999/".to_string();
        let backend = Backend::from_config_with(&config, |name| {
            (name == "STUDY_KEY").then(|| "sk-test".to_string())
        })
        .expect("live");
        match backend {
            Backend::Live(chat) => {
                assert_eq!(chat.endpoint, "http://localhost:9999/v1/chat/completions");
                assert_eq!(chat.api_key, "sk-test");
            }
            Backend::Mock => panic!("expected live backend"),
        }
    }

    #[test]
    fn body_includes_system_and_temperature() {
        let request = ChatRequest {
            system: Some("be kind".to_string()),
            user: "hi".to_string(),
            max_tokens: 400,
            temperature: Some(0.25),
        };
        let body = build_completion_body("gpt-4o-mini", &request);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["max_tokens"], 400);
        assert_eq!(body["temperature"], 0.25);
    }

    #[test]
    fn body_without_system_has_only_user_message() {
        let request = ChatRequest {
            system: None,
            user: "hi".to_string(),
            max_tokens: 10,
            temperature: None,
        };
        let body = build_completion_body("m", &request);
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn extracts_trimmed_content() {
        let response = json!({"choices": [{"message": {"role": "assistant", "content": "  ok \n"}}]});
        assert_eq!(extract_content(&response).expect("content"), "ok");
        assert!(extract_content(&json!({"choices": []})).is_err());
    }
}
