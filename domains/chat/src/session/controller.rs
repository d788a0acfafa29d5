//! Async driver for a chat session
//!
//! [`ChatSession`] wires the pure [`Session`] to its collaborators: it sends
//! started turns to the relay, feeds frames back into the session in arrival
//! order, and persists the captured profile. Suggestions for a completed reply
//! are fetched on a background task: the turn returns as soon as its terminal
//! frame arrives, and the list is applied by [`ChatSession::poll_suggestions`]
//! or [`ChatSession::wait_for_suggestions`]. Secondary failures (suggestions,
//! lead save, profile cache) are logged and never affect the turn.

use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::cache::ProfileCache;
use super::client::{LeadClient, RelayClient, SuggestionsClient};
use super::events::SessionEvent;
use super::state::{FrameOutcome, Session, SubmitDecision};
use crate::domain::entities::{MessageRole, Product, UserProfile};
use crate::domain::protocol::TurnRequest;
use crate::domain::state::StateError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Profile requires first name, last name and email")]
    IncompleteProfile,

    #[error(transparent)]
    State(#[from] StateError),
}

/// Result of one session operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent
    Ignored,
    /// Another turn or the capture form is still pending
    Busy,
    /// The submission was buffered behind the capture form
    CaptureRequested,
    Completed,
    /// The reply was replaced by the apology message
    Failed,
}

pub struct ChatSession {
    state: Session,
    relay: Arc<dyn RelayClient>,
    leads: Arc<dyn LeadClient>,
    suggestions: Arc<dyn SuggestionsClient>,
    cache: Option<Arc<dyn ProfileCache>>,
    events: Option<UnboundedSender<SessionEvent>>,
    pending_suggestions: Option<JoinHandle<Vec<String>>>,
}

impl ChatSession {
    pub fn new(
        relay: Arc<dyn RelayClient>,
        leads: Arc<dyn LeadClient>,
        suggestions: Arc<dyn SuggestionsClient>,
    ) -> Self {
        Self {
            state: Session::new(),
            relay,
            leads,
            suggestions,
            cache: None,
            events: None,
            pending_suggestions: None,
        }
    }

    /// Replace the initial session state
    pub fn with_state(mut self, state: Session) -> Self {
        self.state = state;
        self
    }

    /// Restore a previously captured profile and keep the cache for later
    /// captures. A cache that cannot be read is treated as empty.
    pub async fn with_profile_cache(mut self, cache: Arc<dyn ProfileCache>) -> Self {
        match cache.load().await {
            Ok(Some(profile)) => {
                tracing::debug!("Restored cached profile");
                self.state.restore_profile(profile);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read profile cache"),
        }
        self.cache = Some(cache);
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn session(&self) -> &Session {
        &self.state
    }

    /// Apply fetched suggestions if the background request has finished.
    ///
    /// Returns whether the suggestion list changed.
    pub fn poll_suggestions(&mut self) -> bool {
        let Some(task) = self.pending_suggestions.as_mut() else {
            return false;
        };
        match task.now_or_never() {
            Some(result) => {
                self.pending_suggestions = None;
                self.apply_suggestions(result);
                true
            }
            None => false,
        }
    }

    /// Wait for the outstanding suggestions request, if any, and apply it
    pub async fn wait_for_suggestions(&mut self) {
        if let Some(task) = self.pending_suggestions.take() {
            let result = task.await;
            self.apply_suggestions(result);
        }
    }

    /// Submit user text; `product` overrides the sticky product for this turn
    pub async fn submit(
        &mut self,
        text: &str,
        product: Option<Product>,
    ) -> Result<SubmitOutcome, SessionError> {
        let decision = self.state.submit(text, product);
        self.dispatch(decision).await
    }

    pub async fn select_suggestion(&mut self, text: &str) -> Result<SubmitOutcome, SessionError> {
        let decision = self.state.select_suggestion(text);
        self.dispatch(decision).await
    }

    pub async fn select_product(&mut self, product: Product) -> Result<SubmitOutcome, SessionError> {
        let decision = self.state.select_product(product);
        self.dispatch(decision).await
    }

    /// Persist a captured profile and flush the buffered submission with it
    pub async fn submit_profile(
        &mut self,
        profile: UserProfile,
    ) -> Result<SubmitOutcome, SessionError> {
        if !profile.is_complete() {
            return Err(SessionError::IncompleteProfile);
        }

        if let Err(e) = self.leads.save_lead(&profile).await {
            tracing::warn!(error = %e, "Failed to save lead; continuing chat");
        }
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&profile).await {
                tracing::warn!(error = %e, "Failed to cache profile");
            }
        }

        match self.state.submit_profile(profile)? {
            Some(request) => self.run_turn(request).await,
            None => Ok(SubmitOutcome::Ignored),
        }
    }

    /// Dismiss the capture form and flush the buffered submission
    pub async fn skip_profile(&mut self) -> Result<SubmitOutcome, SessionError> {
        match self.state.skip_profile()? {
            Some(request) => self.run_turn(request).await,
            None => Ok(SubmitOutcome::Ignored),
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is rendering
            let _ = events.send(event);
        }
    }

    async fn dispatch(
        &mut self,
        decision: Result<SubmitDecision, StateError>,
    ) -> Result<SubmitOutcome, SessionError> {
        match decision {
            Ok(SubmitDecision::Ignored) => Ok(SubmitOutcome::Ignored),
            Ok(SubmitDecision::CaptureRequired) => {
                tracing::info!("Capture form requested before sending turn");
                self.emit(SessionEvent::CaptureRequested);
                Ok(SubmitOutcome::CaptureRequested)
            }
            Ok(SubmitDecision::Start(request)) => self.run_turn(request).await,
            Err(StateError::TurnInProgress(state)) => {
                tracing::debug!(state = %state, "Submission rejected while busy");
                Ok(SubmitOutcome::Busy)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn run_turn(&mut self, request: TurnRequest) -> Result<SubmitOutcome, SessionError> {
        // Suggestions for the previous reply are stale once a new turn starts
        if !self.poll_suggestions() {
            if let Some(stale) = self.pending_suggestions.take() {
                stale.abort();
            }
        }

        let Some(assistant_index) = self.state.in_flight_index() else {
            return Err(SessionError::State(StateError::InvalidTransition {
                from: self.state.turn_state().to_string(),
                event: "run_turn".to_string(),
            }));
        };
        self.emit(SessionEvent::MessageAppended {
            index: assistant_index - 1,
            role: MessageRole::User,
        });
        self.emit(SessionEvent::MessageAppended {
            index: assistant_index,
            role: MessageRole::Assistant,
        });

        let mut frames = match self.relay.stream_turn(request).await {
            Ok(frames) => frames,
            Err(e) => {
                tracing::error!(error = %e, "Relay request failed");
                return self.fail_turn();
            }
        };

        while let Some(frame) = frames.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!(error = %e, "Relay stream failed");
                    return self.fail_turn();
                }
            };

            match self.state.apply_frame(&frame)? {
                FrameOutcome::Appended { index, delta } => {
                    self.emit(SessionEvent::ContentDelta { index, delta });
                }
                FrameOutcome::Completed {
                    index,
                    content,
                    product,
                    adopted_thread,
                } => {
                    if let Some(thread_id) = adopted_thread {
                        tracing::info!(thread_id = %thread_id, "Adopted conversation thread");
                        self.emit(SessionEvent::ThreadAdopted(thread_id));
                    }
                    self.emit(SessionEvent::TurnFinished { index });
                    self.spawn_suggestions(content, product);
                    return Ok(SubmitOutcome::Completed);
                }
                FrameOutcome::Failed { index } => {
                    self.emit(SessionEvent::TurnFailed { index });
                    return Ok(SubmitOutcome::Failed);
                }
            }
        }

        tracing::error!("Relay stream closed without a terminal frame");
        self.fail_turn()
    }

    fn fail_turn(&mut self) -> Result<SubmitOutcome, SessionError> {
        let index = self.state.fail_turn()?;
        self.emit(SessionEvent::TurnFailed { index });
        Ok(SubmitOutcome::Failed)
    }

    fn spawn_suggestions(&mut self, content: String, product: Option<Product>) {
        let client = self.suggestions.clone();
        let events = self.events.clone();

        self.pending_suggestions = Some(tokio::spawn(async move {
            let suggestions = match client.suggest(&content, product).await {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to fetch suggestions");
                    Vec::new()
                }
            };
            if let Some(events) = events {
                let _ = events.send(SessionEvent::SuggestionsUpdated(suggestions.clone()));
            }
            suggestions
        }));
    }

    fn apply_suggestions(&mut self, result: Result<Vec<String>, tokio::task::JoinError>) {
        match result {
            Ok(suggestions) => self.state.set_suggestions(suggestions),
            Err(e) => {
                tracing::warn!(error = %e, "Suggestions task did not finish");
                self.state.set_suggestions(Vec::new());
            }
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(task) = self.pending_suggestions.take() {
            task.abort();
        }
    }
}
