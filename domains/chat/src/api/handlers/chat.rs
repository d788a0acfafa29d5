//! Streaming chat handler

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use funnel_common::{Error, Result, ValidatedJson};

use crate::api::middleware::ChatState;
use crate::domain::protocol::{StreamFrame, TurnRequest};

/// Relay one turn as server-sent events, one JSON frame per event
pub async fn stream_chat(
    State(state): State<ChatState>,
    ValidatedJson(req): ValidatedJson<TurnRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    if req.latest_user_message().is_none() {
        return Err(Error::Validation(
            "messages must contain a non-empty user message".to_string(),
        ));
    }

    tracing::info!(
        messages = req.messages.len(),
        thread_id = ?req.existing_thread(),
        product = ?req.product_context,
        "Relaying chat turn"
    );

    let frames = state
        .relay
        .relay(req)
        .map(|frame| Ok::<_, Infallible>(frame_event(&frame)));

    Ok(Sse::new(frames).keep_alive(KeepAlive::default()))
}

fn frame_event(frame: &StreamFrame) -> Event {
    match serde_json::to_string(frame) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize stream frame");
            Event::default().data(r#"{"content":"","done":true,"error":"serialization failure"}"#)
        }
    }
}
