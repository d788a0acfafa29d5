//! Chat domain: streaming assistant relay, follow-up suggestions and the
//! client-side chat session controller
//!
//! The server half ([`relay`], [`suggestions`], [`api`]) turns one
//! conversational turn into a normalized frame stream. The client half
//! ([`session`]) drives a chat widget: turn-taking, incremental rendering,
//! follow-up suggestions and the one-time profile capture.

pub mod api;
pub mod domain;
pub mod relay;
pub mod session;
pub mod suggestions;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Message, MessageRole, Product, UserProfile};
pub use domain::protocol::{FrameKind, StreamFrame, SuggestionsRequest, SuggestionsResponse, TurnRequest};
pub use domain::state::{StateError, TurnEvent, TurnState, TurnStateMachine};

// Re-export service types
pub use relay::RelayService;
pub use suggestions::SuggestionsService;

// Re-export session controller types
pub use session::{ChatSession, HttpFunnelClient, Session, SessionError, SessionEvent, SubmitOutcome};

// Re-export API types
pub use api::routes;
pub use api::ChatState;
