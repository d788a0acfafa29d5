//! Chat domain state

use crate::relay::RelayService;
use crate::suggestions::SuggestionsService;

/// Application state for the Chat domain
#[derive(Clone)]
pub struct ChatState {
    pub relay: RelayService,
    pub suggestions: SuggestionsService,
}
