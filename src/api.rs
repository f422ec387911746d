//! LLM API interaction with linear backoff retry logic.
//!
//! This module talks to an OpenAI-compatible chat completions endpoint. It is
//! used for two jobs: short-text translation and per-category briefings.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`ChatClient`]: Real client posting `{model, messages, stream: false}` over `reqwest`
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//!
//! Callers hold an `Option` of a client; `None` means no credential was
//! configured and the LLM features are switched off.

use crate::config::LlmConfig;
use crate::http::{retry_with_backoff, RetryPolicy};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Trait for async LLM interaction.
///
/// Implementors send a system instruction plus a user message and return the
/// model's text reply. This abstraction lets the translator and the briefing
/// generator run against decorators or in-test fakes.
pub trait AskAsync {
    async fn ask(&self, system: &str, user: &str) -> Result<String, Box<dyn Error>>;
}

impl<T: AskAsync + ?Sized> AskAsync for &T {
    async fn ask(&self, system: &str, user: &str) -> Result<String, Box<dyn Error>> {
        (**self).ask(system, user).await
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Chat completions client bound to one model.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(
        http: Client,
        config: &LlmConfig,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AskAsync for ChatClient {
    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn ask(&self, system: &str, user: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: ChatResponse = resp.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or("chat completion returned no choices")?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            reply_preview = %truncate_for_log(&content, 120),
            "Chat completion received"
        );
        Ok(content)
    }
}

/// Wrapper that adds linear backoff retry logic to any [`AskAsync`] implementation.
pub struct RetryAsk<T> {
    /// The underlying LLM client to wrap.
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_attempts", &self.policy.max_attempts)
            .field("base_delay", &self.policy.base_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    async fn ask(&self, system: &str, user: &str) -> Result<String, Box<dyn Error>> {
        let res =
            retry_with_backoff(self.policy, "chat completion", || self.inner.ask(system, user))
                .await;
        if let Err(e) = &res {
            warn!(error = %e, "LLM request failed after retries");
        }
        res
    }
}
