//! OpenAI Assistants (v2) implementation
//!
//! Threads, messages and runs are plain JSON calls; the run is started with
//! `stream: true` and its server-sent events are decoded with
//! `eventsource-stream` into [`RunEvent`]s.

use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::openai::error_from_response;
use crate::{AssistantConfig, AssistantService, LlmError, RunEvent, RunEventStream};

const ASSISTANTS_BETA_HEADER: &str = "assistants=v2";

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    additional_instructions: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaEvent {
    delta: MessageDelta,
}

#[derive(Debug, Deserialize)]
struct MessageDelta {
    #[serde(default)]
    content: Vec<DeltaContent>,
}

#[derive(Debug, Deserialize)]
struct DeltaContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<DeltaText>,
}

#[derive(Debug, Deserialize)]
struct DeltaText {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    status: Option<String>,
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    code: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: Option<String>,
}

/// Decode one provider event into a [`RunEvent`].
///
/// Returns `Ok(None)` for events the relay does not care about (run steps,
/// message creation, status changes).
pub(crate) fn decode_run_event(event: &str, data: &str) -> Result<Option<RunEvent>, LlmError> {
    match event {
        "thread.message.delta" => {
            let parsed: MessageDeltaEvent = serde_json::from_str(data).map_err(|e| {
                LlmError::Stream(format!("Malformed thread.message.delta event: {}", e))
            })?;
            let text: String = parsed
                .delta
                .content
                .into_iter()
                .filter(|c| c.content_type == "text")
                .filter_map(|c| c.text.and_then(|t| t.value))
                .collect();
            if text.is_empty() {
                Ok(None)
            } else {
                Ok(Some(RunEvent::ContentDelta(text)))
            }
        }
        "thread.run.completed" => Ok(Some(RunEvent::Completed)),
        "thread.run.failed" | "thread.run.cancelled" | "thread.run.expired"
        | "thread.run.incomplete" => {
            let reason = serde_json::from_str::<RunObject>(data)
                .ok()
                .and_then(|run| match run.last_error {
                    Some(err) => Some(match err.code {
                        Some(code) => format!("{}: {}", code, err.message),
                        None => err.message,
                    }),
                    None => run.status,
                })
                .unwrap_or_else(|| event.trim_start_matches("thread.run.").to_string());
            Ok(Some(RunEvent::Failed(reason)))
        }
        "error" => {
            let reason = serde_json::from_str::<StreamError>(data)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| data.to_string());
            Ok(Some(RunEvent::Failed(reason)))
        }
        _ => Ok(None),
    }
}

/// OpenAI assistant service
pub struct OpenAiAssistantService {
    client: Client,
    config: AssistantConfig,
    base_url: String,
}

impl OpenAiAssistantService {
    pub fn new(config: AssistantConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER)
    }
}

#[async_trait::async_trait]
impl AssistantService for OpenAiAssistantService {
    async fn create_thread(&self) -> Result<String, LlmError> {
        let response = self
            .post("/v1/threads")
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("Thread creation failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let thread: ThreadObject = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse thread: {}", e)))?;

        tracing::debug!(thread_id = %thread.id, "Created assistant thread");
        Ok(thread.id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), LlmError> {
        let response = self
            .post(&format!("/v1/threads/{}/messages", thread_id))
            .json(&CreateMessageRequest {
                role: "user",
                content,
            })
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("Message creation failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    async fn stream_run(
        &self,
        thread_id: &str,
        additional_instructions: &str,
    ) -> Result<RunEventStream, LlmError> {
        tracing::debug!(thread_id = %thread_id, "Starting streaming assistant run");

        let response = self
            .post(&format!("/v1/threads/{}/runs", thread_id))
            .json(&CreateRunRequest {
                assistant_id: &self.config.assistant_id,
                additional_instructions,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("Run creation failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let mut events = response.bytes_stream().eventsource();

        let stream = async_stream::stream! {
            while let Some(next) = events.next().await {
                let event = match next {
                    Ok(event) => event,
                    Err(e) => {
                        yield Err(LlmError::Stream(e.to_string()));
                        break;
                    }
                };

                if event.event == "done" {
                    break;
                }

                match decode_run_event(&event.event, &event.data) {
                    Ok(Some(run_event)) => {
                        let terminal = run_event.is_terminal();
                        yield Ok(run_event);
                        if terminal {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}
