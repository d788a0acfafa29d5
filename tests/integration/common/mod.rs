//! Common test utilities and fixtures for integration tests
//!
//! Every test app runs on mock providers and the in-memory lead store, so no
//! external service or database is needed.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use funnel_chat::{ChatState, RelayService, StreamFrame, SuggestionsService};
use funnel_leads::{InMemoryLeadStore, LeadsState};
use funnel_llm::mock::{MockAssistantService, MockLlmService};
use serde_json::Value;

/// Test application wired to inspectable mocks
#[derive(Clone)]
pub struct TestApp {
    pub assistant: MockAssistantService,
    pub llm: MockLlmService,
    pub leads: InMemoryLeadStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            assistant: MockAssistantService::new(),
            llm: MockLlmService::new(),
            leads: InMemoryLeadStore::new(),
        }
    }

    /// Router with the same routes as the production application
    pub fn test_router(&self) -> Router {
        let chat_state = ChatState {
            relay: RelayService::new(Arc::new(self.assistant.clone())),
            suggestions: SuggestionsService::new(Arc::new(self.llm.clone())),
        };
        let leads_state = LeadsState {
            leads: Arc::new(self.leads.clone()),
        };
        funnel_app::build_router(chat_state, leads_state)
    }

    /// Serve the router on an ephemeral local port and return its base URL
    pub async fn spawn(&self) -> Result<String> {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let router = self.test_router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("test server stopped: {e}");
            }
        });

        Ok(format!("http://{}", addr))
    }
}

/// Build a JSON request
pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Read a complete event-stream body and decode every `data:` line as a frame
pub async fn parse_frames(response: Response<Body>) -> Vec<StreamFrame> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    text.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim_start()).unwrap())
        .collect()
}
