//! Model client abstraction.
//!
//! The [`ModelClient`] trait decouples the dialogue engine from the model
//! backend (currently an OpenAI-compatible chat-completions API). Tests use
//! scripted clients that return predetermined replies without any network.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::io::config::CoachConfig;

/// Abstraction over text-generation backends.
///
/// One call may block for the full provider latency. Transport and provider
/// errors propagate unchanged; the engine neither retries nor times out
/// beyond the client's own request timeout.
pub trait ModelClient {
    /// Generate free text for `prompt`, optionally under a system instruction.
    fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String>;
}

impl<T: ModelClient + ?Sized> ModelClient for &T {
    fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        (**self).generate(prompt, system)
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Works against OpenAI itself as well as compatible gateways (e.g.
/// DashScope compatible mode) by pointing `base_url` at them.
#[derive(Debug)]
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &CoachConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow!(
                "missing API key (set COACH_API_KEY or OPENAI_API_KEY)"
            ));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body(&self, prompt: &str, system: Option<&str>) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt}));
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

impl ModelClient for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model, prompt_bytes = prompt.len()))]
    fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        info!(url = %url, "calling model");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, system))
            .send()
            .context("send chat completion request")?;

        let status = response.status();
        let payload: Value = response.json().context("decode chat completion body")?;
        if !status.is_success() {
            warn!(%status, "model call failed");
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown provider error");
            return Err(anyhow!("model call failed ({status}): {message}"));
        }

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("chat completion response missing message content"))?;
        debug!(reply_bytes = content.len(), "model call completed");
        Ok(content.to_string())
    }
}
