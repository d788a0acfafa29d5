//! In-memory lead store
//!
//! Process-lifetime storage guarded by an `RwLock`. Clones share the same map.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use funnel_common::RepositoryError;

use super::LeadStore;
use crate::domain::entities::{Lead, NewLead};

#[derive(Debug, Clone, Default)]
pub struct InMemoryLeadStore {
    leads: Arc<RwLock<HashMap<String, Lead>>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct leads stored
    pub fn len(&self) -> usize {
        self.leads.read().map(|l| l.len()).unwrap_or(0)
    }

    #[mutants::skip] // Delegates to len()
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored lead for an email, matched case-insensitively
    pub fn get(&self, email: &str) -> Option<Lead> {
        self.leads
            .read()
            .ok()
            .and_then(|l| l.get(&email.trim().to_lowercase()).cloned())
    }
}

#[async_trait::async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn upsert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let mut leads = self
            .leads
            .write()
            .map_err(|e| RepositoryError::Unavailable(format!("leads lock poisoned: {e}")))?;

        let stored = match leads.get_mut(&lead.email) {
            Some(existing) => {
                existing.merge(lead);
                existing.clone()
            }
            None => {
                let created = lead.into_lead();
                leads.insert(created.email.clone(), created.clone());
                created
            }
        };

        Ok(stored)
    }
}
