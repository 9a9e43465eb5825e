use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::submission::SubmissionPayload;
use crate::config::BackendConfig;

pub const ENROLLMENT_PATH: &str = "/enrollment-3d";
pub const DEVICE_KEY_HEADER: &str = "X-Device-Key";
pub const USER_AGENT_HEADER: &str = "X-User-Agent";

/// One outbound enrollment exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub user_agent: String,
    pub payload: SubmissionPayload,
}

/// Transport seam so the processor can be exercised without a live backend.
///
/// Implementations send exactly one request per call and never retry.
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn enroll(&self, request: &EnrollmentRequest) -> Result<Value, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend response was not JSON (status {status}): {source}")]
    Decode {
        status: reqwest::StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

/// reqwest-backed client for the enrollment endpoint.
#[derive(Clone)]
pub struct HttpBackendClient {
    http: Client,
    base_url: String,
    device_key: String,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>, device_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            device_key: device_key.into(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.base_url.clone(), config.device_key.clone())
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), ENROLLMENT_PATH)
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn enroll(&self, request: &EnrollmentRequest) -> Result<Value, BackendError> {
        let res = self
            .http
            .post(self.endpoint())
            .header(DEVICE_KEY_HEADER, &self.device_key)
            .header(USER_AGENT_HEADER, &request.user_agent)
            .json(&request.payload)
            .send()
            .await?;

        // Rejections arrive as JSON bodies, so the status alone decides nothing.
        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), "enrollment response received");

        serde_json::from_str(&body).map_err(|source| BackendError::Decode { status, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let client = HttpBackendClient::new("https://api.example.test/", "key");
        assert_eq!(client.endpoint(), "https://api.example.test/enrollment-3d");

        let client = HttpBackendClient::new("http://127.0.0.1:3000", "key");
        assert_eq!(client.endpoint(), "http://127.0.0.1:3000/enrollment-3d");
    }
}
