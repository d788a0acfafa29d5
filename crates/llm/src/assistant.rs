//! Assistant provider abstraction
//!
//! The relay only needs three capabilities from the provider: create a
//! conversation thread, append a user message to it, and start a streaming
//! run. Provider-specific event vocabularies are reduced to [`RunEvent`].

use futures::stream::BoxStream;

use crate::{mock, openai_assistant, LlmError, DEFAULT_OPENAI_BASE_URL};

/// Normalized event emitted by a streaming assistant run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Incremental assistant text
    ContentDelta(String),
    /// The run finished successfully
    Completed,
    /// The run failed; carries the provider's reason
    Failed(String),
}

impl RunEvent {
    /// Whether this event ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Completed | RunEvent::Failed(_))
    }
}

/// Stream of run events. Transport or decoding failures surface as `Err` items.
pub type RunEventStream = BoxStream<'static, Result<RunEvent, LlmError>>;

/// Conversation-thread based assistant provider
#[async_trait::async_trait]
pub trait AssistantService: Send + Sync {
    /// Create a new conversation thread and return its identifier
    async fn create_thread(&self) -> Result<String, LlmError>;

    /// Append a user message to an existing thread
    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), LlmError>;

    /// Start a streaming run of the configured assistant on a thread
    async fn stream_run(
        &self,
        thread_id: &str,
        additional_instructions: &str,
    ) -> Result<RunEventStream, LlmError>;
}

/// Assistant provider configuration
#[derive(Clone)]
pub struct AssistantConfig {
    /// Provider (openai, mock)
    pub provider: String,
    pub api_key: String,
    /// Identifier of the assistant configured at the provider
    pub assistant_id: String,
    pub base_url: String,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("assistant_id", &self.assistant_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AssistantConfig {
    /// Create assistant config from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();

        let provider =
            std::env::var("ASSISTANT_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let assistant_id = std::env::var("OPENAI_ASSISTANT_ID").unwrap_or_default();

        let config = Self {
            provider,
            api_key,
            assistant_id,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), LlmError> {
        if self.provider == "mock" {
            return Ok(());
        }
        if self.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "OPENAI_API_KEY is required for the openai assistant provider".to_string(),
            ));
        }
        if self.assistant_id.is_empty() {
            return Err(LlmError::Configuration(
                "OPENAI_ASSISTANT_ID is required for the openai assistant provider".to_string(),
            ));
        }
        Ok(())
    }
}

/// Factory for [`AssistantService`] implementations
pub struct AssistantServiceFactory;

impl AssistantServiceFactory {
    /// Create an assistant service based on configuration
    pub fn create(config: AssistantConfig) -> Result<Box<dyn AssistantService>, LlmError> {
        match config.provider.as_str() {
            "openai" => {
                config.validate()?;
                tracing::info!(assistant_id = %config.assistant_id, "Creating OpenAI assistant service");
                Ok(Box::new(openai_assistant::OpenAiAssistantService::new(
                    config,
                )))
            }
            "mock" => {
                tracing::info!("Creating mock assistant service");
                Ok(Box::new(mock::MockAssistantService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown assistant provider: {}. Supported providers: openai, mock",
                provider
            ))),
        }
    }
}
