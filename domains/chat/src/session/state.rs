//! Pure chat session state
//!
//! [`Session`] owns the message history, the adopted thread, the sticky
//! product, the suggestion list and the capture policy. It performs no I/O:
//! every operation returns what the driver has to do next (send a
//! [`TurnRequest`], show the capture form, render a delta).
//!
//! The turn phase is a sum type, so a buffered submission can only exist
//! while the capture form is up and never while a reply is streaming.

use crate::domain::entities::{Message, MessageRole, Product, UserProfile};
use crate::domain::protocol::{FrameKind, StreamFrame, TurnRequest};
use crate::domain::state::{StateError, TurnEvent, TurnState, TurnStateMachine};

/// Completed assistant replies after which the capture form is shown
pub const CAPTURE_THRESHOLD: usize = 3;

/// Content that replaces a failed assistant reply
pub const APOLOGY: &str = "I'm sorry, I encountered an error. Please try again.";

/// A submission held back while the capture form is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub text: String,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// The assistant message at `assistant_index` is receiving deltas
    AwaitingStream {
        assistant_index: usize,
        product: Option<Product>,
    },
    AwaitingCapture { pending: PendingTurn },
}

impl SessionPhase {
    pub fn turn_state(&self) -> TurnState {
        match self {
            Self::Idle => TurnState::Idle,
            Self::AwaitingStream { .. } => TurnState::AwaitingStream,
            Self::AwaitingCapture { .. } => TurnState::AwaitingCapture,
        }
    }
}

/// Progress of the one-time profile capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    NotShown,
    Shown,
    Captured,
    Skipped,
}

/// What the driver must do after a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDecision {
    /// Blank input; nothing changed
    Ignored,
    /// The submission was buffered and the capture form must be shown
    CaptureRequired,
    /// Send this request to the relay
    Start(TurnRequest),
}

/// Effect of one relay frame on the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Appended {
        index: usize,
        delta: String,
    },
    Completed {
        index: usize,
        content: String,
        product: Option<Product>,
        /// Set when this turn supplied the session's first thread id
        adopted_thread: Option<String>,
    },
    Failed {
        index: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    messages: Vec<Message>,
    thread_id: Option<String>,
    product: Option<Product>,
    suggestions: Vec<String>,
    profile: UserProfile,
    capture: CaptureState,
    phase: SessionPhase,
    capture_threshold: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            thread_id: None,
            product: None,
            suggestions: Vec::new(),
            profile: UserProfile::default(),
            capture: CaptureState::NotShown,
            phase: SessionPhase::Idle,
            capture_threshold: CAPTURE_THRESHOLD,
        }
    }

    pub fn with_capture_threshold(mut self, threshold: usize) -> Self {
        self.capture_threshold = threshold;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Sticky product context
    pub fn product(&self) -> Option<Product> {
        self.product
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    #[mutants::skip] // Delegates to SessionPhase::turn_state()
    pub fn turn_state(&self) -> TurnState {
        self.phase.turn_state()
    }

    pub fn pending(&self) -> Option<&PendingTurn> {
        match &self.phase {
            SessionPhase::AwaitingCapture { pending } => Some(pending),
            _ => None,
        }
    }

    /// Index of the assistant message currently receiving deltas
    pub fn in_flight_index(&self) -> Option<usize> {
        match self.phase {
            SessionPhase::AwaitingStream {
                assistant_index, ..
            } => Some(assistant_index),
            _ => None,
        }
    }

    /// Assistant messages with content, the apology included
    pub fn assistant_reply_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant && m.has_content())
            .count()
    }

    /// Adopt a profile restored from a local cache.
    ///
    /// A complete profile counts as already captured.
    pub fn restore_profile(&mut self, profile: UserProfile) {
        if profile.is_complete() {
            self.capture = CaptureState::Captured;
        }
        self.profile = profile;
    }

    /// Submit user text, with `product` overriding the sticky product for
    /// this turn only.
    pub fn submit(
        &mut self,
        text: &str,
        product: Option<Product>,
    ) -> Result<SubmitDecision, StateError> {
        if text.trim().is_empty() {
            return Ok(SubmitDecision::Ignored);
        }
        self.ensure_accepts_submissions()?;

        let product = product.or(self.product);

        if self.capture_due() {
            let next = TurnStateMachine::transition(self.turn_state(), TurnEvent::RequestCapture)?;
            debug_assert_eq!(next, TurnState::AwaitingCapture);
            self.capture = CaptureState::Shown;
            self.phase = SessionPhase::AwaitingCapture {
                pending: PendingTurn {
                    text: text.to_string(),
                    product,
                },
            };
            return Ok(SubmitDecision::CaptureRequired);
        }

        let request = self.start_turn(text.to_string(), product, TurnEvent::StartStream)?;
        Ok(SubmitDecision::Start(request))
    }

    /// Make `product` sticky and ask about it
    pub fn select_product(&mut self, product: Product) -> Result<SubmitDecision, StateError> {
        self.ensure_accepts_submissions()?;
        self.product = Some(product);
        self.submit(
            &format!("Tell me about {}", product.display_name()),
            Some(product),
        )
    }

    pub fn select_suggestion(&mut self, text: &str) -> Result<SubmitDecision, StateError> {
        self.submit(text, None)
    }

    /// Record a captured profile and flush the buffered submission with it
    pub fn submit_profile(
        &mut self,
        profile: UserProfile,
    ) -> Result<Option<TurnRequest>, StateError> {
        self.profile = profile;
        self.capture = CaptureState::Captured;
        self.flush_pending()
    }

    /// Dismiss the capture form for the rest of the session and flush the
    /// buffered submission with the current profile.
    ///
    /// Only a form that is actually shown can be skipped.
    pub fn skip_profile(&mut self) -> Result<Option<TurnRequest>, StateError> {
        if self.capture == CaptureState::Shown {
            self.capture = CaptureState::Skipped;
        }
        self.flush_pending()
    }

    /// Apply one relay frame to the in-flight assistant message
    pub fn apply_frame(&mut self, frame: &StreamFrame) -> Result<FrameOutcome, StateError> {
        let (index, product) = self.in_flight(TurnEvent::Finish)?;

        match frame.kind() {
            FrameKind::Delta(delta) => {
                self.messages[index].content.push_str(delta);
                Ok(FrameOutcome::Appended {
                    index,
                    delta: delta.to_string(),
                })
            }
            FrameKind::Done { thread_id } => {
                let adopted_thread = match thread_id.filter(|id| !id.trim().is_empty()) {
                    Some(id) if self.thread_id.is_none() => {
                        self.thread_id = Some(id.to_string());
                        Some(id.to_string())
                    }
                    Some(id) => {
                        if self.thread_id.as_deref() != Some(id) {
                            tracing::warn!(
                                current = ?self.thread_id,
                                received = %id,
                                "Ignoring different thread id from relay"
                            );
                        }
                        None
                    }
                    None => None,
                };

                TurnStateMachine::transition(self.turn_state(), TurnEvent::Finish)?;
                self.phase = SessionPhase::Idle;

                Ok(FrameOutcome::Completed {
                    index,
                    content: self.messages[index].content.clone(),
                    product,
                    adopted_thread,
                })
            }
            FrameKind::Error(error) => {
                tracing::warn!(error = %error, "Relay reported a failed turn");
                self.fail_turn().map(|index| FrameOutcome::Failed { index })
            }
        }
    }

    /// End the in-flight turn with the apology message.
    ///
    /// Partial content is replaced, not appended to.
    pub fn fail_turn(&mut self) -> Result<usize, StateError> {
        let (index, _) = self.in_flight(TurnEvent::Fail)?;
        TurnStateMachine::transition(self.turn_state(), TurnEvent::Fail)?;

        self.messages[index].content = APOLOGY.to_string();
        self.phase = SessionPhase::Idle;
        Ok(index)
    }

    /// Replace the suggestion list wholesale
    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    fn ensure_accepts_submissions(&self) -> Result<(), StateError> {
        let state = self.turn_state();
        if state.accepts_submissions() {
            Ok(())
        } else {
            Err(StateError::TurnInProgress(state.to_string()))
        }
    }

    fn capture_due(&self) -> bool {
        self.capture == CaptureState::NotShown
            && !self.profile.is_complete()
            && self.assistant_reply_count() >= self.capture_threshold
    }

    fn in_flight(&self, event: TurnEvent) -> Result<(usize, Option<Product>), StateError> {
        match self.phase {
            SessionPhase::AwaitingStream {
                assistant_index,
                product,
            } => Ok((assistant_index, product)),
            _ => Err(StateError::InvalidTransition {
                from: self.turn_state().to_string(),
                event: event.to_string(),
            }),
        }
    }

    fn flush_pending(&mut self) -> Result<Option<TurnRequest>, StateError> {
        let pending = match &self.phase {
            SessionPhase::AwaitingCapture { pending } => pending.clone(),
            _ => return Ok(None),
        };

        self.start_turn(pending.text, pending.product, TurnEvent::ResolveCapture)
            .map(Some)
    }

    fn start_turn(
        &mut self,
        text: String,
        product: Option<Product>,
        event: TurnEvent,
    ) -> Result<TurnRequest, StateError> {
        TurnStateMachine::transition(self.turn_state(), event)?;

        self.messages.push(Message::user(text));
        let history: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::User || m.has_content())
            .cloned()
            .collect();

        self.messages.push(Message::assistant(""));
        self.phase = SessionPhase::AwaitingStream {
            assistant_index: self.messages.len() - 1,
            product,
        };

        Ok(TurnRequest {
            messages: history,
            thread_id: self.thread_id.clone(),
            product_context: product,
            user_profile: (!self.profile.is_empty()).then(|| self.profile.clone()),
        })
    }
}
