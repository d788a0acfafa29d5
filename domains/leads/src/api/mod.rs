//! API layer for the Leads domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::LeadsState;
pub use routes::routes;
