//! OpenAI-compatible chat completions client.
//!
//! Sends each prompt as a single user message to
//! `{base_url}/chat/completions` and returns the first choice's text.
//! Works with any endpoint speaking that protocol (GitHub Models, OpenAI,
//! OpenRouter, local gateways).

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use askmail_core::LanguageModel;
use askmail_shared::{AskmailError, LlmSettings, Result};

/// Longest slice of an error body echoed back in error messages.
const ERROR_BODY_PREVIEW: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// `{"error": {"message": ...}}` body returned by most providers on failure.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat completions client bound to one endpoint and model.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
}

impl ChatClient {
    /// Build a client from resolved settings.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("askmail/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AskmailError::Llm(format!("client build: {e}")))?;

        Ok(Self {
            http,
            endpoint: completions_endpoint(settings.base_url.as_str()),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            temperature: settings.temperature,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[async_trait]
impl LanguageModel for ChatClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AskmailError::Llm(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AskmailError::Llm(format!("{}: {e}", self.endpoint)))?;

        if !status.is_success() {
            return Err(AskmailError::Llm(format!(
                "HTTP {status}: {}",
                error_detail(&body)
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            AskmailError::Llm(format!(
                "invalid completion response: {e} (got: {})",
                preview(&body)
            ))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AskmailError::Llm("completion response has no content".into()))?;

        match parsed.usage {
            Some(usage) => debug!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                latency_ms = start.elapsed().as_millis(),
                "completion received"
            ),
            None => debug!(latency_ms = start.elapsed().as_millis(), "completion received"),
        }

        Ok(text)
    }
}

/// Provider error message if the body carries one, else a raw preview.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => preview(body).to_string(),
    }
}

fn preview(body: &str) -> &str {
    askmail_core::messages::char_prefix(body.trim(), ERROR_BODY_PREVIEW)
}
