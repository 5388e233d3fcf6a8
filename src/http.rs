use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use thiserror::Error;

/// Timeout applied to every outbound webhook call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
}

/// Outbound HTTP seam for the notification channels.
///
/// Returns the response body as text regardless of HTTP status; webhook
/// backends report delivery problems in the body (an error envelope on 4xx)
/// and callers interpret it. Only transport-level failures are errors.
#[async_trait]
pub trait HttpPoster: Send + Sync {
    async fn post_json(&self, url: &str, body: String) -> Result<String, HttpError>;
}

/// Production poster: one shared `reqwest` client, TLS verification on,
/// 10-second timeout, no headers beyond `Content-Type: application/json`.
pub struct ReqwestPoster {
    client: Client,
}

impl ReqwestPoster {
    pub fn new() -> Self {
        // Panics if the TLS backend cannot initialize.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");
        Self { client }
    }
}

impl Default for ReqwestPoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpPoster for ReqwestPoster {
    async fn post_json(&self, url: &str, body: String) -> Result<String, HttpError> {
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout
                } else {
                    HttpError::Transport(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(HttpError::Transport)?;
        tracing::debug!(%status, bytes = text.len(), "webhook POST completed");
        Ok(text)
    }
}
