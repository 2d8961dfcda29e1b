use crate::config::Config;
use crate::events::Turn;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Normalized failure of a chat request.
///
/// `Display` yields the human-readable reason that ends up in the error turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Non-success HTTP status
    #[error("{message}")]
    Status { status: u16, message: String },
    /// Request never completed (connect, DNS, timeout, ...)
    #[error("{0}")]
    Network(String),
    /// Success status but the body was not the expected JSON
    #[error("{0}")]
    Malformed(String),
}

/// Boundary for the single outbound call of a submission
pub trait ChatTransport: Send + Sync {
    /// Send `message` with the prior `history`; yields the reply text if the
    /// endpoint supplied one.
    fn send<'a>(
        &'a self,
        message: &'a str,
        history: &'a [Turn],
    ) -> BoxFuture<'a, Result<Option<String>, TransportError>>;
}

/// Body POSTed to the completion endpoint
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub history: &'a [Turn],
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(rename = "aiResponse")]
    ai_response: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// JSON-over-HTTP transport to `<endpoint>/api/chat`
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.chat_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, message: &str, history: &[Turn]) -> Result<Option<String>, TransportError> {
        let payload = ChatRequest { message, history };

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        parse_reply(&body)
    }
}

impl ChatTransport for HttpTransport {
    fn send<'a>(
        &'a self,
        message: &'a str,
        history: &'a [Turn],
    ) -> BoxFuture<'a, Result<Option<String>, TransportError>> {
        Box::pin(self.post(message, history))
    }
}

/// Build the failure for a non-success response, preferring the server's
/// `error` field.
fn status_error(status: u16, body: &str) -> TransportError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status));
    TransportError::Status { status, message }
}

fn parse_reply(body: &str) -> Result<Option<String>, TransportError> {
    let reply: ChatReply =
        serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))?;
    Ok(reply.ai_response)
}
