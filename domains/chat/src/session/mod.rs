//! Conversation session controller
//!
//! [`Session`] is the pure state (messages, thread, capture policy, pending
//! submission); [`ChatSession`] drives it against the relay, lead and
//! suggestion collaborators.

pub mod cache;
pub mod client;
pub mod controller;
pub mod events;
pub mod state;

pub use cache::{CacheError, FileProfileCache, MemoryProfileCache, ProfileCache};
pub use client::{
    ClientError, FrameStream, HttpFunnelClient, LeadClient, RelayClient, SuggestionsClient,
};
pub use controller::{ChatSession, SessionError, SubmitOutcome};
pub use events::SessionEvent;
pub use state::{
    CaptureState, FrameOutcome, PendingTurn, Session, SessionPhase, SubmitDecision, APOLOGY,
    CAPTURE_THRESHOLD,
};
