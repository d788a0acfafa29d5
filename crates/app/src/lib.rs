//! Funnel application composition root
//!
//! Builds the provider services from environment configuration and composes
//! the chat and leads routers into a single application.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use funnel_chat::{ChatState, RelayService, SuggestionsService};
use funnel_common::Config;
use funnel_leads::{InMemoryLeadStore, LeadStore, LeadsState, PgLeadStore};
use funnel_llm::{AssistantConfig, AssistantServiceFactory, LlmConfig, LlmServiceFactory};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

/// Create the main application router with all routes
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let assistant = AssistantServiceFactory::create(AssistantConfig::from_env()?)?;
    let llm = LlmServiceFactory::create(LlmConfig::from_env()?)?;

    let leads: Arc<dyn LeadStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url)
                .await
                .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
            sqlx::migrate!("../../migrations").run(&pool).await?;
            tracing::info!("Database connection established, migrations applied");
            Arc::new(PgLeadStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; leads are kept in memory only");
            Arc::new(InMemoryLeadStore::new())
        }
    };

    let chat_state = ChatState {
        relay: RelayService::new(Arc::from(assistant)),
        suggestions: SuggestionsService::new(Arc::from(llm)),
    };

    Ok(build_router(chat_state, LeadsState { leads }))
}

/// Compose domain routers with the shared infrastructure routes
pub fn build_router(chat_state: ChatState, leads_state: LeadsState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Funnel Chat API v0.0.1-SNAPSHOT" }),
        )
        .merge(funnel_chat::routes().with_state(chat_state))
        .merge(funnel_leads::routes().with_state(leads_state))
}

/// CORS policy for the browser widgets.
///
/// An unparseable origin falls back to the permissive policy.
pub fn cors_layer(config: &Config) -> CorsLayer {
    match config.cors_allow_origin.as_deref() {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Invalid CORS_ALLOW_ORIGIN, using permissive CORS");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
