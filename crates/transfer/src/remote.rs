//! Storage server client.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use unitrack_storage::FileInfo;

use crate::error::{Result, TransferError};
use crate::files::{FileSink, FileSource};

/// Request timeout for storage server calls.
const TIMEOUT_SECS: u64 = 60;

/// A storage folder on a remote storage server.
#[derive(Clone)]
pub struct RemoteFolder {
    /// HTTP client
    client: Client,

    /// Server base URL, without a trailing slash
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequest<'a> {
    file_name: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct LoadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ListResponse {
    files: Vec<FileInfo>,
}

impl RemoteFolder {
    /// Client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Files stored on the server.
    pub async fn list(&self) -> Result<Vec<FileInfo>> {
        let response = self
            .client
            .get(format!("{}/api/storage-files", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        let body: ListResponse = response.json().await?;
        Ok(body.files)
    }
}

#[async_trait]
impl FileSource for RemoteFolder {
    async fn read_file(&self, name: &str) -> Result<Option<String>> {
        debug!(file = name, "Loading remote file");
        let response = self
            .client
            .get(format!("{}/api/load-progress/{}", self.base_url, name))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let body: LoadResponse = response.json().await?;
        match (body.success, body.data) {
            (true, Some(data)) => Ok(Some(serde_json::to_string(&data)?)),
            (_, _) => Err(TransferError::Remote(
                body.error.unwrap_or_else(|| format!("no data returned for {}", name)),
            )),
        }
    }
}

#[async_trait]
impl FileSink for RemoteFolder {
    async fn write_file(&self, name: &str, content: &str) -> Result<()> {
        debug!(file = name, bytes = content.len(), "Saving remote file");
        let response = self
            .client
            .post(format!("{}/api/save-progress", self.base_url))
            .json(&SaveRequest {
                file_name: name,
                content,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        Ok(())
    }

    async fn remove_file(&self, name: &str) -> Result<()> {
        debug!(file = name, "Deleting remote file");
        let response = self
            .client
            .delete(format!("{}/api/delete-progress/{}", self.base_url, name))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(remote_error(response).await)
    }
}

async fn remote_error(response: reqwest::Response) -> TransferError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<LoadResponse>(&text)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or(text);
    TransferError::Remote(format!("status {}: {}", status, message))
}
