use std::time::Duration;

use collector_core::{endpoint_url, Record};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;

use crate::{SubmitError, SubmitFailure};

pub const COLLECT_PATH: &str = "/api/extension/collect";
pub const HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 1024 * 1024,
        }
    }
}

#[derive(Serialize)]
struct CollectPayload<'a> {
    tweets: &'a [Record],
}

/// Network side of the collector endpoint.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// One request carrying the whole batch. Returns the decoded JSON reply.
    async fn post_batch(
        &self,
        endpoint: &str,
        records: &[Record],
    ) -> Result<serde_json::Value, SubmitError>;

    async fn health(&self, endpoint: &str) -> Result<serde_json::Value, SubmitError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| SubmitError::new(SubmitFailure::Network, err.to_string()))
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<serde_json::Value, SubmitError> {
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::new(
                SubmitFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        let too_large = || {
            SubmitError::new(
                SubmitFailure::TooLarge { max_bytes },
                "collector reply exceeded size limit",
            )
        };
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if body.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .map_err(|err| SubmitError::new(SubmitFailure::MalformedResponse, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post_batch(
        &self,
        endpoint: &str,
        records: &[Record],
    ) -> Result<serde_json::Value, SubmitError> {
        let url = endpoint_url(endpoint, COLLECT_PATH)
            .map_err(|err| SubmitError::new(SubmitFailure::InvalidEndpoint, err.to_string()))?;
        let body = serde_json::to_vec(&CollectPayload { tweets: records })
            .map_err(|err| SubmitError::new(SubmitFailure::Encode, err.to_string()))?;

        let response = self
            .build_client()?
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        self.read_json(response).await
    }

    async fn health(&self, endpoint: &str) -> Result<serde_json::Value, SubmitError> {
        let url = endpoint_url(endpoint, HEALTH_PATH)
            .map_err(|err| SubmitError::new(SubmitFailure::InvalidEndpoint, err.to_string()))?;
        let response = self
            .build_client()?
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json(response).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::new(SubmitFailure::Timeout, err.to_string());
    }
    if err.is_builder() {
        return SubmitError::new(SubmitFailure::InvalidEndpoint, err.to_string());
    }
    SubmitError::new(SubmitFailure::Network, err.to_string())
}
