//! Lead capture API handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use funnel_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::LeadsState;
use crate::domain::entities::{Lead, NewLead};

/// Request for saving a captured profile
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveLeadRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    /// Trimmed, lowercased and checked by [`NewLead::new`]
    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,
}

/// Lead response DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponse {
    fn from(l: Lead) -> Self {
        Self {
            id: l.id,
            first_name: l.first_name,
            last_name: l.last_name,
            email: l.email,
            phone: l.phone,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

/// Save (upsert by email) a captured profile
pub async fn save_lead(
    State(state): State<LeadsState>,
    ValidatedJson(req): ValidatedJson<SaveLeadRequest>,
) -> Result<Json<LeadResponse>> {
    let submission = NewLead::new(
        &req.first_name,
        &req.last_name,
        &req.email,
        req.phone.as_deref(),
    )?;

    let lead = state.leads.upsert(submission).await?;

    tracing::info!(lead_id = %lead.id, "Lead saved");

    Ok(Json(lead.into()))
}
