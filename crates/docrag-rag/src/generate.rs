//! Client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! The default configuration targets Groq. Any server speaking the same
//! request and response shape (a local llama.cpp or vLLM server, for example)
//! works by changing `generation.endpoint`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use docrag_core::config::GenerationSettings;
use docrag_core::traits::TextGenerator;
use docrag_core::{Error, Result};

pub struct ChatCompletionsClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::upstream(None, format!("building HTTP client: {e}")))?;
        if settings.api_key.is_none() {
            tracing::warn!(endpoint = %settings.endpoint, "no generation API key configured; sending unauthenticated requests");
        }
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            api_key: settings.api_key.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl TextGenerator for ChatCompletionsClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            error!(endpoint = %self.endpoint, error = %e, "generation request failed");
            Error::upstream(e.status().map(|s| s.as_u16()), format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text).map(|e| e.error.message).unwrap_or(text);
            error!(%status, "generation service returned an error");
            return Err(Error::upstream(Some(status.as_u16()), detail));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::upstream(Some(status.as_u16()), format!("malformed response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::upstream(Some(status.as_u16()), "response contained no message content"))
    }
}
