//! Funnel LLM providers
//!
//! Two capabilities are consumed from the external provider:
//! - [`LlmService`]: one-shot chat completions (used to generate follow-up suggestions)
//! - [`AssistantService`]: conversation threads and streaming assistant runs
//!
//! Each has a real OpenAI implementation and a deterministic mock, selected
//! through a factory from environment configuration.

pub mod assistant;
pub mod mock;
pub mod openai;
pub mod openai_assistant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use assistant::{
    AssistantConfig, AssistantService, AssistantServiceFactory, RunEvent, RunEventStream,
};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 256;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM stream error: {0}")]
    Stream(String),

    #[error("LLM rate limit exceeded")]
    RateLimit,
}

/// Role of a message sent to the completion API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
    Assistant,
}

/// A single message in a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }
}

/// Completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Empty string selects the service's default model
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

/// Completion response
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// Completion service configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider (openai, mock)
    pub provider: String,
    pub api_key: String,
    /// Override for the provider base URL
    pub base_url: Option<String>,
    pub default_model: String,
    pub max_tokens: u32,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmConfig {
    /// Create completion config from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();

        if provider != "mock" && api_key.is_empty() {
            return Err(LlmError::Configuration(
                "OPENAI_API_KEY is required for the openai completion provider".to_string(),
            ));
        }

        let max_tokens = match std::env::var("SUGGESTIONS_MAX_TOKENS") {
            Ok(raw) => raw.parse().map_err(|_| {
                LlmError::Configuration(format!(
                    "SUGGESTIONS_MAX_TOKENS must be a positive integer, got {raw:?}"
                ))
            })?,
            Err(_) => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            provider,
            api_key,
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
            default_model: std::env::var("SUGGESTIONS_MODEL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_MODEL.to_string()),
            max_tokens,
        })
    }
}

/// One-shot chat completion service
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Run a completion and return the full response text
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when a request leaves `model` empty
    fn default_model(&self) -> &str;
}

/// Factory for [`LlmService`] implementations
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create a completion service based on configuration
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "openai" => {
                if config.api_key.is_empty() {
                    return Err(LlmError::Configuration(
                        "OPENAI_API_KEY is required for the openai completion provider"
                            .to_string(),
                    ));
                }
                tracing::info!(model = %config.default_model, "Creating OpenAI completion service");
                Ok(Box::new(openai::OpenAiService::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock completion service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: openai, mock",
                provider
            ))),
        }
    }
}
