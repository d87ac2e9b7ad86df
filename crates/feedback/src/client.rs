//! HTTP client for the feedback service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::error::{FeedbackError, Result};
use crate::request::{FeedbackRequest, FeedbackResponse};

/// Default request timeout; scoring is slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Something that turns an answer into feedback.
#[async_trait]
pub trait FeedbackGateway: Send + Sync {
    /// Score one answer.
    async fn request(&self, request: &FeedbackRequest) -> Result<FeedbackResponse>;
}

/// Feedback service reached over HTTP.
#[derive(Clone)]
pub struct FeedbackClient {
    /// HTTP client
    client: Client,

    /// Endpoint requests are POSTed to
    url: String,
}

impl FeedbackClient {
    /// Client posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Client posting to `url` with a custom request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedbackGateway for FeedbackClient {
    async fn request(&self, request: &FeedbackRequest) -> Result<FeedbackResponse> {
        debug!(
            unit_id = %request.unit_id,
            task_id = %request.outcome_task_id,
            chars = request.answer_text.len(),
            "Requesting feedback"
        );

        let response = self.client.post(&self.url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
