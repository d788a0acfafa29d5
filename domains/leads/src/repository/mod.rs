//! Lead store implementations
//!
//! The chat widgets run across many request-handling workers, so leads never
//! live in a module-level map. [`LeadStore`] is the seam: Postgres in
//! production, [`InMemoryLeadStore`] for local development and tests.

pub mod leads;
pub mod memory;

use funnel_common::RepositoryError;

use crate::domain::entities::{Lead, NewLead};

pub use leads::PgLeadStore;
pub use memory::InMemoryLeadStore;

/// Durable lead storage keyed by email.
///
/// Implementations must be safe to share between concurrent requests and
/// `upsert` must be idempotent for repeated submissions of the same email.
#[async_trait::async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert a lead, or update the existing lead with the same email
    async fn upsert(&self, lead: NewLead) -> Result<Lead, RepositoryError>;
}
