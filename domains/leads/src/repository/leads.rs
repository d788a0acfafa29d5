//! Postgres lead repository

use funnel_common::RepositoryError;
use sqlx::PgPool;

use super::LeadStore;
use crate::domain::entities::{Lead, NewLead};

#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LeadStore for PgLeadStore {
    async fn upsert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let candidate = lead.into_lead();

        let stored = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (id, first_name, last_name, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = COALESCE(EXCLUDED.phone, leads.phone),
                updated_at = EXCLUDED.updated_at
            RETURNING id, first_name, last_name, email, phone, created_at, updated_at
            "#,
        )
        .bind(candidate.id)
        .bind(&candidate.first_name)
        .bind(&candidate.last_name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }
}
