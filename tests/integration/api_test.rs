//! API endpoint integration tests
//!
//! Router-level tests for the chat relay, suggestions and leads endpoints,
//! plus an end-to-end chat session against a live local server.

#![allow(dead_code)]

mod chat;
mod common;
mod leads;
mod session;
mod suggestions;
