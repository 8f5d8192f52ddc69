#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The evaluator boundary: the request the session sends out, the error
//! taxonomy of a failed call, and the transports that can answer it.

use std::future::Future;

use anyhow::{Result, bail};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use bon::Builder;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::verdict::ValidationVerdict;
use crate::{
    config::{ConfigState, OpenAiEnv},
    constants::PROMPT_TRUNCATE,
};

/// Payload sent to the evaluator for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// The snippet the learner is explaining.
    pub code:        String,
    /// Language of the snippet.
    pub language:    String,
    /// The learner's explanation, as typed.
    pub explanation: String,
}

/// Ways an evaluator call can fail. The session treats them all alike.
#[derive(thiserror::Error, Debug)]
pub enum EvaluatorError {
    /// The request never produced a response.
    #[error("Could not reach the evaluator: {0}")]
    Transport(#[from] reqwest::Error),
    /// The evaluator answered with a non-success status.
    #[error("The evaluator responded with status {0}")]
    Status(StatusCode),
    /// The response body was not a verdict.
    #[error("The evaluator response could not be parsed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The LLM judge request failed.
    #[error("The LLM judge request failed: {0}")]
    Judge(#[from] async_openai::error::OpenAIError),
    /// The LLM judge answered without any content.
    #[error("The LLM judge returned an empty completion")]
    EmptyCompletion,
}

/// An external judge for learner explanations.
pub trait Evaluator {
    /// Scores one explanation. Called exactly once per accepted submit.
    fn evaluate(
        &self,
        request: &ValidationRequest,
    ) -> impl Future<Output = Result<ValidationVerdict, EvaluatorError>> + Send;
}

/// Evaluator backed by an HTTP service that accepts a [`ValidationRequest`]
/// as JSON and answers with a camelCase [`ValidationVerdict`].
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct HttpEvaluator {
    /// Fully qualified URL the request is POSTed to.
    endpoint: String,
    /// Shared HTTP client.
    client:   Client,
}

impl HttpEvaluator {
    /// Returns the endpoint this evaluator posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Evaluator for HttpEvaluator {
    async fn evaluate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationVerdict, EvaluatorError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EvaluatorError::Status(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Evaluator that asks an OpenAI-compatible chat model to act as the judge.
#[derive(Clone, Builder)]
#[builder(on(String, into))]
pub struct OpenAiEvaluator {
    /// Credentials and sampling parameters.
    env:           OpenAiEnv,
    /// System prompt describing the verdict schema.
    system_prompt: String,
}

impl OpenAiEvaluator {
    /// Builds the chat transcript for one request.
    fn messages(
        &self,
        request: &ValidationRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, EvaluatorError> {
        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt(request))
                .build()?
                .into(),
        ])
    }
}

impl Evaluator for OpenAiEvaluator {
    async fn evaluate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationVerdict, EvaluatorError> {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(self.env.api_base())
                .with_api_key(self.env.api_key()),
        );

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.env.model())
            .messages(self.messages(request)?);
        if let Some(temperature) = self.env.temperature() {
            args.temperature(temperature);
        }
        if let Some(top_p) = self.env.top_p() {
            args.top_p(top_p);
        }

        let response = client.chat().create(args.build()?).await?;
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(EvaluatorError::EmptyCompletion)?;

        parse_judge_output(&content)
    }
}

/// Renders the learner's submission as the judge's user message. Long
/// snippets are cut to [`PROMPT_TRUNCATE`] characters.
fn user_prompt(request: &ValidationRequest) -> String {
    let code: String = request.code.chars().take(PROMPT_TRUNCATE).collect();
    let mut prompt = String::new();
    prompt.push_str(&format!("**Language:** {}\n\n", request.language));
    prompt.push_str(&format!("## Code\n\n```{}\n{}\n```\n\n", request.language, code));
    prompt.push_str("## Learner Explanation\n\n");
    prompt.push_str(&request.explanation);
    prompt.push('\n');
    prompt
}

/// Parses a verdict out of a model completion, tolerating a surrounding
/// Markdown code fence.
pub(crate) fn parse_judge_output(content: &str) -> Result<ValidationVerdict, EvaluatorError> {
    let trimmed = content.trim();
    let body = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    };

    if body.is_empty() {
        return Err(EvaluatorError::EmptyCompletion);
    }
    Ok(serde_json::from_str(body)?)
}

/// Whichever evaluator the environment configures.
#[derive(Clone)]
pub enum ConfiguredEvaluator {
    /// A dedicated evaluation service.
    Http(HttpEvaluator),
    /// An LLM acting as the judge.
    OpenAi(OpenAiEvaluator),
}

impl ConfiguredEvaluator {
    /// Picks the evaluator from configuration. An explicit HTTP endpoint
    /// wins over OpenAI credentials.
    pub fn from_config(config: &ConfigState) -> Result<Self> {
        if let Some(endpoint) = config.evaluator_endpoint() {
            return Ok(ConfiguredEvaluator::Http(
                HttpEvaluator::builder()
                    .endpoint(endpoint)
                    .client(config.http_client())
                    .build(),
            ));
        }

        if let Some(env) = config.openai() {
            return Ok(ConfiguredEvaluator::OpenAi(
                OpenAiEvaluator::builder()
                    .env(env.clone())
                    .system_prompt(config.judge_prompt())
                    .build(),
            ));
        }

        bail!(
            "No evaluator configured. Set FEYNMAN_EVALUATOR_ENDPOINT, or OPENAI_ENDPOINT, \
             OPENAI_API_KEY and OPENAI_MODEL."
        )
    }

    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfiguredEvaluator::Http(_) => "http",
            ConfiguredEvaluator::OpenAi(_) => "openai",
        }
    }
}

impl Evaluator for ConfiguredEvaluator {
    async fn evaluate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationVerdict, EvaluatorError> {
        match self {
            ConfiguredEvaluator::Http(inner) => inner.evaluate(request).await,
            ConfiguredEvaluator::OpenAi(inner) => inner.evaluate(request).await,
        }
    }
}
