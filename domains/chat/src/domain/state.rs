//! State machine for chat turn-taking
//!
//! Turn states: Idle → AwaitingStream → Idle on a normal turn,
//! Idle → AwaitingCapture → AwaitingStream → Idle when the profile capture
//! interrupts a submission.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during turn transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot apply {event} while {from}")]
    InvalidTransition { from: String, event: String },

    #[error("A turn is already in progress ({0})")]
    TurnInProgress(String),
}

/// Turn states of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    AwaitingStream,
    AwaitingCapture,
}

impl TurnState {
    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [TurnState] {
        match self {
            Self::Idle => &[Self::AwaitingStream, Self::AwaitingCapture],
            Self::AwaitingStream => &[Self::Idle],
            Self::AwaitingCapture => &[Self::AwaitingStream],
        }
    }

    /// Whether a new submission may start from this state
    pub fn accepts_submissions(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingStream => write!(f, "awaiting_stream"),
            Self::AwaitingCapture => write!(f, "awaiting_capture"),
        }
    }
}

/// Events that trigger turn state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnEvent {
    /// A submission was sent to the relay
    StartStream,
    /// A submission was buffered behind the capture form
    RequestCapture,
    /// The capture form was submitted or skipped; the buffered turn is sent
    ResolveCapture,
    /// The relay stream ended with a done frame
    Finish,
    /// The relay stream ended with an error frame or a transport failure
    Fail,
}

impl std::fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartStream => write!(f, "start_stream"),
            Self::RequestCapture => write!(f, "request_capture"),
            Self::ResolveCapture => write!(f, "resolve_capture"),
            Self::Finish => write!(f, "finish"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Turn state machine
pub struct TurnStateMachine;

impl TurnStateMachine {
    /// Attempt a state transition
    pub fn transition(current: TurnState, event: TurnEvent) -> Result<TurnState, StateError> {
        let next = match (current, event) {
            (TurnState::Idle, TurnEvent::StartStream) => TurnState::AwaitingStream,
            (TurnState::Idle, TurnEvent::RequestCapture) => TurnState::AwaitingCapture,
            (TurnState::AwaitingCapture, TurnEvent::ResolveCapture) => TurnState::AwaitingStream,
            (TurnState::AwaitingStream, TurnEvent::Finish | TurnEvent::Fail) => TurnState::Idle,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }
}
