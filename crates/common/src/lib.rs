//! Shared configuration, error handling and extractors for the funnel chat service
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration loaded from the environment following 12-factor principles
//! - The HTTP-facing error type and result alias
//! - Repository error mapping for storage backends
//! - A JSON extractor that validates request bodies

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
