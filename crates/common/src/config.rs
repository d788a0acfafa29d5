//! Configuration management following 12-factor app principles
//!
//! Server-level settings are loaded from environment variables. Provider
//! credentials live with the crates that use them (`funnel_llm::LlmConfig`,
//! `funnel_llm::AssistantConfig`).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Postgres URL for the lead store. `None` selects the in-memory store.
    pub database_url: Option<String>,

    /// Allowed browser origin for the chat widgets. `None` means permissive.
    pub cors_allow_origin: Option<String>,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cors_allow_origin", &self.cors_allow_origin)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number, got {raw:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL"),
            cors_allow_origin: non_empty_var("CORS_ALLOW_ORIGIN"),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "funnel=debug".to_string()),
            port,
        })
    }
}

/// Read an environment variable, treating blank values as unset.
pub fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
