//! Streaming Response Relay
//!
//! Turns one [`TurnRequest`] into a stream of [`StreamFrame`]s: zero or more
//! content deltas followed by exactly one terminal frame. Every failure
//! (thread creation, message append, run start, stream read, provider run
//! failure) becomes the terminal error frame, after which the stream ends.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use funnel_llm::{AssistantService, RunEvent};

use crate::domain::instructions::compose_instructions;
use crate::domain::protocol::{StreamFrame, TurnRequest};

/// Message carried by the terminal error frame
pub const RELAY_ERROR_MESSAGE: &str = "The assistant could not complete this response.";

/// Relay between the chat widgets and the assistant provider
#[derive(Clone)]
pub struct RelayService {
    assistant: Arc<dyn AssistantService>,
}

impl RelayService {
    pub fn new(assistant: Arc<dyn AssistantService>) -> Self {
        Self { assistant }
    }

    /// Relay one turn.
    ///
    /// The returned stream owns everything it needs, so it can outlive the
    /// request handler that created it.
    pub fn relay(&self, request: TurnRequest) -> impl Stream<Item = StreamFrame> + Send + 'static {
        let assistant = Arc::clone(&self.assistant);

        async_stream::stream! {
            let Some(latest) = request.latest_user_message().map(str::to_string) else {
                tracing::warn!("Turn request without a user message");
                yield StreamFrame::error(RELAY_ERROR_MESSAGE);
                return;
            };

            let thread_id = match request.existing_thread() {
                Some(id) => id.to_string(),
                None => match assistant.create_thread().await {
                    Ok(id) => {
                        tracing::info!(thread_id = %id, "Started new assistant thread");
                        id
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to create assistant thread");
                        yield StreamFrame::error(RELAY_ERROR_MESSAGE);
                        return;
                    }
                },
            };

            if let Err(e) = assistant.add_user_message(&thread_id, &latest).await {
                tracing::error!(error = %e, thread_id = %thread_id, "Failed to append user message");
                yield StreamFrame::error(RELAY_ERROR_MESSAGE);
                return;
            }

            let instructions =
                compose_instructions(request.user_profile.as_ref(), request.product_context);

            let mut run = match assistant.stream_run(&thread_id, &instructions).await {
                Ok(run) => run,
                Err(e) => {
                    tracing::error!(error = %e, thread_id = %thread_id, "Failed to start assistant run");
                    yield StreamFrame::error(RELAY_ERROR_MESSAGE);
                    return;
                }
            };

            let mut deltas: usize = 0;
            while let Some(event) = run.next().await {
                match event {
                    Ok(RunEvent::ContentDelta(text)) => {
                        deltas += 1;
                        yield StreamFrame::delta(text);
                    }
                    Ok(RunEvent::Completed) => {
                        tracing::debug!(thread_id = %thread_id, deltas, "Assistant run completed");
                        yield StreamFrame::done(thread_id);
                        return;
                    }
                    Ok(RunEvent::Failed(reason)) => {
                        tracing::error!(thread_id = %thread_id, reason = %reason, deltas, "Assistant run failed");
                        yield StreamFrame::error(RELAY_ERROR_MESSAGE);
                        return;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, thread_id = %thread_id, deltas, "Assistant stream broke");
                        yield StreamFrame::error(RELAY_ERROR_MESSAGE);
                        return;
                    }
                }
            }

            tracing::error!(thread_id = %thread_id, deltas, "Assistant stream ended without a terminal event");
            yield StreamFrame::error(RELAY_ERROR_MESSAGE);
        }
    }
}
