//! Mock provider implementations
//!
//! Used by the factories when the provider is `"mock"` and by tests that
//! need deterministic, scriptable provider behaviour.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::StreamExt;

use crate::{
    AssistantService, CompletionRequest, CompletionResponse, LlmError, LlmService, RunEvent,
    RunEventStream,
};

/// Mock completion service.
///
/// Without a scripted reply it answers with four canned follow-up questions
/// mentioning the last user message, one per line.
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the content of the next completion
    pub fn push_reply(&self, content: impl Into<String>) {
        self.replies
            .lock()
            .expect("replies lock poisoned by a prior panic")
            .push_back(Ok(content.into()));
    }

    /// Queue a failure for the next completion
    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .expect("replies lock poisoned by a prior panic")
            .push_back(Err(message.into()));
    }

    /// All requests received so far
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("requests lock poisoned by a prior panic")
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!("Mock LLM service processing completion request");

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model.clone()
        };

        let last_message = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        self.requests
            .lock()
            .map_err(|e| LlmError::Request(format!("requests lock poisoned: {e}")))?
            .push(request);

        let scripted = self
            .replies
            .lock()
            .map_err(|e| LlmError::Request(format!("replies lock poisoned: {e}")))?
            .pop_front();

        let content = match scripted {
            Some(Ok(content)) => content,
            Some(Err(message)) => return Err(LlmError::Response(message)),
            None => {
                let topic: String = last_message.chars().take(40).collect();
                format!(
                    "1. Can you tell me more about {topic}?\n\
                     2. How much does it cost?\n\
                     3. How quickly will I see results?\n\
                     4. Is there a guarantee?"
                )
            }
        };

        let input_tokens = last_message.len() as i32 / 4;
        let output_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            content,
            model,
            input_tokens,
            output_tokens,
            stop_reason: "stop".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

/// One step of a scripted mock run
#[derive(Debug, Clone, PartialEq)]
pub enum MockRunStep {
    Delta(String),
    Complete,
    Fail(String),
    /// A transport/decoding error item in the middle of the stream
    StreamError(String),
}

/// Calls recorded by [`MockAssistantService`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantCalls {
    pub created_threads: Vec<String>,
    /// `(thread_id, content)` per appended message
    pub messages: Vec<(String, String)>,
    /// `(thread_id, additional_instructions)` per started run
    pub runs: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct MockAssistantInner {
    next_thread: u32,
    scripts: VecDeque<Vec<MockRunStep>>,
    fail_thread_creation: bool,
    fail_run_start: bool,
    calls: AssistantCalls,
}

/// Mock assistant service with scriptable runs.
///
/// Unscripted runs echo the last message as `Mock response to: <text>` split
/// into word deltas, followed by a completion event.
#[derive(Debug, Clone, Default)]
pub struct MockAssistantService {
    inner: Arc<Mutex<MockAssistantInner>>,
}

impl MockAssistantService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockAssistantInner> {
        self.inner
            .lock()
            .expect("assistant lock poisoned by a prior panic")
    }

    /// Queue the steps of the next run
    pub fn push_run(&self, steps: Vec<MockRunStep>) {
        self.lock().scripts.push_back(steps);
    }

    /// Make every `create_thread` call fail
    pub fn fail_thread_creation(&self) {
        self.lock().fail_thread_creation = true;
    }

    /// Make every `stream_run` call fail before any event is produced
    pub fn fail_run_start(&self) {
        self.lock().fail_run_start = true;
    }

    /// Snapshot of every call received so far
    pub fn calls(&self) -> AssistantCalls {
        self.lock().calls.clone()
    }
}

fn echo_steps(last_message: &str) -> Vec<MockRunStep> {
    let reply = format!("Mock response to: {}", last_message);
    let mut steps: Vec<MockRunStep> = reply
        .split_inclusive(' ')
        .map(|word| MockRunStep::Delta(word.to_string()))
        .collect();
    steps.push(MockRunStep::Complete);
    steps
}

#[async_trait::async_trait]
impl AssistantService for MockAssistantService {
    async fn create_thread(&self) -> Result<String, LlmError> {
        let mut inner = self.lock();
        if inner.fail_thread_creation {
            return Err(LlmError::Request("mock thread creation failure".to_string()));
        }
        inner.next_thread += 1;
        let thread_id = format!("thread_mock_{}", inner.next_thread);
        inner.calls.created_threads.push(thread_id.clone());
        Ok(thread_id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), LlmError> {
        self.lock()
            .calls
            .messages
            .push((thread_id.to_string(), content.to_string()));
        Ok(())
    }

    async fn stream_run(
        &self,
        thread_id: &str,
        additional_instructions: &str,
    ) -> Result<RunEventStream, LlmError> {
        let steps = {
            let mut inner = self.lock();
            if inner.fail_run_start {
                return Err(LlmError::Response("mock run start failure".to_string()));
            }
            inner
                .calls
                .runs
                .push((thread_id.to_string(), additional_instructions.to_string()));

            match inner.scripts.pop_front() {
                Some(steps) => steps,
                None => {
                    let last = inner
                        .calls
                        .messages
                        .iter()
                        .rev()
                        .find(|(t, _)| t == thread_id)
                        .map(|(_, content)| content.clone())
                        .unwrap_or_default();
                    echo_steps(&last)
                }
            }
        };

        let events = steps.into_iter().map(|step| match step {
            MockRunStep::Delta(text) => Ok(RunEvent::ContentDelta(text)),
            MockRunStep::Complete => Ok(RunEvent::Completed),
            MockRunStep::Fail(reason) => Ok(RunEvent::Failed(reason)),
            MockRunStep::StreamError(reason) => Err(LlmError::Stream(reason)),
        });

        Ok(futures::stream::iter(events).boxed())
    }
}
