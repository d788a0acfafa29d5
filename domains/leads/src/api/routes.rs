//! Route definitions for Leads domain API

use axum::{routing::post, Router};

use super::handlers::leads;
use super::middleware::LeadsState;

/// Create all Leads domain API routes
pub fn routes() -> Router<LeadsState> {
    Router::new().route("/api/leads", post(leads::save_lead))
}
