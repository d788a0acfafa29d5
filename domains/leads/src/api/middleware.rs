//! Leads domain state

use crate::LeadStore;
use std::sync::Arc;

/// Application state for the Leads domain
#[derive(Clone)]
pub struct LeadsState {
    pub leads: Arc<dyn LeadStore>,
}
