//! Wire protocol between the chat widgets and the server
//!
//! A turn is posted as a [`TurnRequest`]; the relay answers with a stream of
//! [`StreamFrame`]s, one JSON payload per server-sent event. The last frame is
//! always terminal (`done: true`, optionally with `error`).

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entities::{Message, MessageRole, Product, UserProfile};

/// One conversational turn sent to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    /// Conversation history, oldest first. The last user message is the new turn.
    #[validate(length(min = 1))]
    pub messages: Vec<Message>,

    /// External thread identifier; absent on the first turn of a session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_context: Option<Product>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
}

impl TurnRequest {
    /// Text of the most recent user message with content
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.content.trim().is_empty())
            .map(|m| m.content.as_str())
    }

    /// Thread identifier, treating blank values as absent
    pub fn existing_thread(&self) -> Option<&str> {
        self.thread_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// One frame of the relay stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFrame {
    /// Delta text; empty on terminal frames
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub done: bool,

    /// Present only on the terminal success frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Present only on the terminal failure frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Interpretation of a frame from the consumer's side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind<'a> {
    Delta(&'a str),
    Done { thread_id: Option<&'a str> },
    Error(&'a str),
}

impl StreamFrame {
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn done(thread_id: impl Into<String>) -> Self {
        Self {
            done: true,
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            done: true,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Classify the frame; an `error` wins over `done`
    pub fn kind(&self) -> FrameKind<'_> {
        if let Some(error) = self.error.as_deref() {
            FrameKind::Error(error)
        } else if self.done {
            FrameKind::Done {
                thread_id: self.thread_id.as_deref(),
            }
        } else {
            FrameKind::Delta(&self.content)
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind(), FrameKind::Delta(_))
    }
}

/// Request for follow-up suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsRequest {
    /// Complete text of the assistant reply
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_context: Option<Product>,
}

/// Follow-up suggestions, at most four
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}
