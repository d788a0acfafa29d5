//! Follow-up suggestion handler

use axum::{extract::State, Json};
use funnel_common::{Result, ValidatedJson};

use crate::api::middleware::ChatState;
use crate::domain::protocol::{SuggestionsRequest, SuggestionsResponse};

/// Generate follow-up suggestions for a completed assistant reply.
///
/// Provider failures yield an empty list rather than an error status.
pub async fn suggest(
    State(state): State<ChatState>,
    ValidatedJson(req): ValidatedJson<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>> {
    let suggestions = state
        .suggestions
        .generate(&req.content, req.product_context)
        .await;

    Ok(Json(SuggestionsResponse { suggestions }))
}
