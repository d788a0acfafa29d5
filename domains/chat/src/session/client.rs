//! Collaborators consumed by the chat session
//!
//! [`HttpFunnelClient`] talks to the funnel server over HTTP. The in-process
//! [`RelayService`] and [`SuggestionsService`] implement the same traits so a
//! session can run without a network hop.

use eventsource_stream::Eventsource;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;

use crate::domain::entities::{Product, UserProfile};
use crate::domain::protocol::{StreamFrame, SuggestionsRequest, SuggestionsResponse, TurnRequest};
use crate::relay::RelayService;
use crate::suggestions::SuggestionsService;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Malformed frame: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Request(e.to_string())
    }
}

/// Frames of one relayed turn, in arrival order
pub type FrameStream = BoxStream<'static, Result<StreamFrame, ClientError>>;

#[async_trait::async_trait]
pub trait RelayClient: Send + Sync {
    async fn stream_turn(&self, request: TurnRequest) -> Result<FrameStream, ClientError>;
}

#[async_trait::async_trait]
pub trait LeadClient: Send + Sync {
    /// Upsert the profile keyed by email
    async fn save_lead(&self, profile: &UserProfile) -> Result<(), ClientError>;
}

#[async_trait::async_trait]
pub trait SuggestionsClient: Send + Sync {
    async fn suggest(
        &self,
        content: &str,
        product: Option<Product>,
    ) -> Result<Vec<String>, ClientError>;
}

/// HTTP client for the funnel server's chat, lead and suggestion endpoints
#[derive(Debug, Clone)]
pub struct HttpFunnelClient {
    http: Client,
    base_url: String,
}

impl HttpFunnelClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl RelayClient for HttpFunnelClient {
    async fn stream_turn(&self, request: TurnRequest) -> Result<FrameStream, ClientError> {
        let response = self
            .http
            .post(self.url("/api/chat"))
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let frames = response
            .bytes_stream()
            .eventsource()
            .map(|event| match event {
                Ok(event) => serde_json::from_str::<StreamFrame>(&event.data)
                    .map_err(|e| ClientError::Decode(e.to_string())),
                Err(e) => Err(ClientError::Stream(e.to_string())),
            });

        Ok(frames.boxed())
    }
}

#[async_trait::async_trait]
impl LeadClient for HttpFunnelClient {
    async fn save_lead(&self, profile: &UserProfile) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/api/leads"))
            .json(profile)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SuggestionsClient for HttpFunnelClient {
    async fn suggest(
        &self,
        content: &str,
        product: Option<Product>,
    ) -> Result<Vec<String>, ClientError> {
        let body = SuggestionsRequest {
            content: content.to_string(),
            product_context: product,
        };
        let response = self
            .http
            .post(self.url("/api/suggestions"))
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let parsed: SuggestionsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.suggestions)
    }
}

#[async_trait::async_trait]
impl RelayClient for RelayService {
    async fn stream_turn(&self, request: TurnRequest) -> Result<FrameStream, ClientError> {
        Ok(self.relay(request).map(Ok).boxed())
    }
}

#[async_trait::async_trait]
impl SuggestionsClient for SuggestionsService {
    async fn suggest(
        &self,
        content: &str,
        product: Option<Product>,
    ) -> Result<Vec<String>, ClientError> {
        Ok(self.generate(content, product).await)
    }
}
