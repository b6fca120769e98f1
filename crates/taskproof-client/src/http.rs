//! HTTP client for the task backend REST endpoints.

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use taskproof_core::{Signature, Task, TaskId};

use crate::error::ClientError;
use crate::sink::{AttestationSink, TaskSource};

/// Body of `PATCH /tasks/{id}/attestation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationPatch {
    pub signature: String,
}

/// HTTP client for the task backend.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check if the backend is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = self.url(&["health"])?;
        debug!(url = %url, "Checking health");

        let response = self.inner.get(url).send().await?;
        Ok(response.status().is_success())
    }

    /// Get JSON from an endpoint.
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.url(segments)?;
        debug!(url = %url, "GET request");

        let response = self.inner.get(url.clone()).send().await?;
        let response = check_status(response, url.path()).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }

    /// List all tasks.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.get_json(&["tasks"]).await
    }

    /// Get a single task.
    pub async fn get_task(&self, task_id: &TaskId) -> Result<Task, ClientError> {
        self.get_json(&["tasks", task_id.as_str()]).await
    }

    /// Store an attestation signature. Last write wins.
    pub async fn patch_attestation(
        &self,
        task_id: &TaskId,
        signature: &Signature,
    ) -> Result<(), ClientError> {
        let url = self.url(&["tasks", task_id.as_str(), "attestation"])?;
        info!(url = %url, task_id = %task_id, "Persisting attestation");

        let body = AttestationPatch {
            signature: signature.as_str().to_string(),
        };
        let response = self.inner.patch(url.clone()).json(&body).send().await?;
        check_status(response, url.path()).await?;
        Ok(())
    }
}

async fn check_status(response: Response, path: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::NOT_FOUND {
        Err(ClientError::NotFound(path.to_string()))
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            path: path.to_string(),
        })
    }
}

#[async_trait]
impl AttestationSink for HttpClient {
    async fn store_attestation(
        &self,
        task_id: &TaskId,
        signature: &Signature,
    ) -> Result<(), ClientError> {
        self.patch_attestation(task_id, signature).await
    }
}

#[async_trait]
impl TaskSource for HttpClient {
    async fn fetch_task(&self, task_id: &TaskId) -> Result<Task, ClientError> {
        self.get_task(task_id).await
    }
}
