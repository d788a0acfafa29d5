//! Notifications pushed to a rendering UI while a session runs

use crate::domain::entities::MessageRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message was appended at `index`; assistant messages start empty
    MessageAppended { index: usize, role: MessageRole },
    /// Text appended to the in-flight assistant message
    ContentDelta { index: usize, delta: String },
    /// A submission was buffered; the UI should show the capture form
    CaptureRequested,
    /// The session adopted the thread identifier returned by the first turn
    ThreadAdopted(String),
    TurnFinished { index: usize },
    /// The assistant message at `index` was replaced by the apology text
    TurnFailed { index: usize },
    SuggestionsUpdated(Vec<String>),
}
