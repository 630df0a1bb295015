//! Chat-completion client for the bookmark generator
//!
//! One request per call, no retry. The endpoint speaks the OpenAI-compatible
//! chat-completions protocol (NVIDIA NIM by default).

use serde::{Deserialize, Serialize};

use crate::error::{BookmindError, Result};
use crate::prompt::CompletionRequest;
use crate::settings::GeneratorConfig;
use crate::utils::safe_truncate;

/// Chat message format
#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat-completions request format
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

/// Chat-completions response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

pub struct GeneratorClient {
    http: reqwest::Client,
    config: GeneratorConfig,
}

impl GeneratorClient {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            BookmindError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { http, config })
    }

    /// Send one completion request and return the raw text of the first choice
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                Message { role: "system", content: &request.system },
                Message { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        log::debug!(
            "Calling {} with model {} ({} bytes of input)",
            self.config.endpoint,
            self.config.model,
            request.user.len()
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::error!("Generator API error {}: {}", status, safe_truncate(&text, 500));
            return Err(BookmindError::Upstream(format!(
                "Generator API error {}: {}",
                status,
                safe_truncate(&text, 500)
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            BookmindError::Upstream(format!("Failed to decode completion envelope: {}", e))
        })?;

        if let Some(usage) = &parsed.usage {
            log::debug!("Generator used {} tokens", usage.total_tokens);
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BookmindError::ResponseFormat("Generator returned no completion content".to_string()))
    }
}
