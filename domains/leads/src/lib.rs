//! Leads domain: captured chat profiles, upserted by email

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Lead, NewLead};

// Re-export repository types
pub use repository::{InMemoryLeadStore, LeadStore, PgLeadStore};

// Re-export API types
pub use api::routes;
pub use api::LeadsState;
