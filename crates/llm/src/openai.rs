//! OpenAI Chat Completions implementation
//!
//! Calls `POST {base_url}/v1/chat/completions` with a non-streaming request
//! using the reqwest HTTP client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    CompletionRequest, CompletionResponse, LlmConfig, LlmError, LlmRole, LlmService,
    DEFAULT_OPENAI_BASE_URL,
};

/// Chat Completions request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

/// Chat Completions response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i32,
    completion_tokens: i32,
}

/// OpenAI API error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: ApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(rename = "type")]
    pub(crate) error_type: Option<String>,
    pub(crate) message: String,
}

/// Turn a non-success response into an [`LlmError`]
pub(crate) async fn error_from_response(response: reqwest::Response) -> LlmError {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimit;
    }

    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());

    if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
        return LlmError::Response(format!(
            "OpenAI API error ({}): {}",
            error_response
                .error
                .error_type
                .unwrap_or_else(|| status.to_string()),
            error_response.error.message
        ));
    }

    LlmError::Response(format!("OpenAI API returned {}: {}", status, error_body))
}

/// OpenAI completion service
pub struct OpenAiService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl OpenAiService {
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl LlmService for OpenAiService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system),
            });
        }
        messages.extend(request.messages.into_iter().map(|m| ChatMessage {
            role: match m.role {
                LlmRole::User => "user".to_string(),
                LlmRole::Assistant => "assistant".to_string(),
            },
            content: Some(m.content),
        }));

        let body = ChatCompletionRequest {
            model: model.clone(),
            max_tokens,
            messages,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!(model = %model, max_tokens = %max_tokens, "Sending OpenAI completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Response("Response contained no choices".to_string()))?;

        let usage = api_response.usage.unwrap_or(Usage {
            prompt_tokens: 0,
            completion_tokens: 0,
        });

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: api_response.model,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            stop_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
