#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::{Context, Result};
use reqwest::Client;

use crate::constants::DEFAULT_EVALUATOR_TIMEOUT_SECS;

/// OpenAI credentials and optional tuning parameters sourced from the
/// environment.
#[derive(Debug, Clone)]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:    String,
    /// API key used to authenticate OpenAI requests.
    api_key:     String,
    /// Model identifier for chat completions.
    model:       String,
    /// Optional temperature override, if provided.
    temperature: Option<f32>,
    /// Optional top-p override, if provided.
    top_p:       Option<f32>,
}

impl OpenAiEnv {
    /// Construct an `OpenAiEnv` from environment variables; returns `None` if
    /// any required field is missing.
    fn from_env() -> Option<Self> {
        let api_base = std::env::var("OPENAI_ENDPOINT").ok()?.trim().to_owned();
        let api_key = std::env::var("OPENAI_API_KEY").ok()?.trim().to_owned();
        let model = std::env::var("OPENAI_MODEL").ok()?.trim().to_owned();

        if api_base.is_empty() || api_key.is_empty() || model.is_empty() {
            return None;
        }

        let temperature = std::env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f32>().ok());
        let top_p = std::env::var("OPENAI_TOP_P")
            .ok()
            .and_then(|s| s.parse::<f32>().ok());

        Some(Self {
            api_base,
            api_key,
            model,
            temperature,
            top_p,
        })
    }

    /// Builds an environment bundle directly, bypassing the process
    /// environment.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base:    api_base.into(),
            api_key:     api_key.into(),
            model:       model.into(),
            temperature: None,
            top_p:       None,
        }
    }

    /// Returns the API base URL used for OpenAI requests.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key used for OpenAI requests.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the configured temperature, if any.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Returns the configured top_p, if any.
    pub fn top_p(&self) -> Option<f32> {
        self.top_p
    }
}

/// Runtime configuration shared across the crate.
pub struct ConfigState {
    /// Shared reqwest HTTP client reused by the HTTP evaluator.
    http_client:        Client,
    /// Dedicated evaluation service, if configured.
    evaluator_endpoint: Option<String>,
    /// Cached OpenAI configuration, if available.
    openai:             Option<OpenAiEnv>,
    /// System prompt for the LLM judge.
    judge_prompt:       String,
}

impl ConfigState {
    /// Construct a new configuration instance by reading the environment and
    /// prompt assets.
    fn new() -> Result<Self> {
        let timeout =
            read_timeout_secs("FEYNMAN_EVALUATOR_TIMEOUT_SECS", DEFAULT_EVALUATOR_TIMEOUT_SECS);
        let evaluator_endpoint = std::env::var("FEYNMAN_EVALUATOR_ENDPOINT").ok();

        Self::from_parts(evaluator_endpoint, OpenAiEnv::from_env(), timeout)
    }

    /// Assembles a configuration from already-resolved transport settings.
    /// A blank endpoint counts as unset.
    pub(crate) fn from_parts(
        evaluator_endpoint: Option<String>,
        openai: Option<OpenAiEnv>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .timeout(timeout)
            .build()
            .context("Failed to construct shared HTTP client")?;

        let evaluator_endpoint = evaluator_endpoint
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            http_client,
            evaluator_endpoint,
            openai,
            judge_prompt: include_str!("prompts/judge.md").to_string(),
        })
    }

    /// Returns a clone of the shared reqwest HTTP client.
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Returns the HTTP evaluator endpoint, if configured.
    pub fn evaluator_endpoint(&self) -> Option<&str> {
        self.evaluator_endpoint.as_deref()
    }

    /// Returns the OpenAI configuration, if all required environment variables
    /// are present.
    pub fn openai(&self) -> Option<&OpenAiEnv> {
        self.openai.as_ref()
    }

    /// Returns the LLM judge system prompt.
    pub fn judge_prompt(&self) -> &str {
        &self.judge_prompt
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let slot = slot();
    let mut guard = slot.lock().expect("config slot poisoned");
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
