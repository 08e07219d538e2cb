// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the completion endpoint.
//!
//! Provides [`CompletionClient`] which handles request construction, status
//! classification, and response decoding. It never retries.

use std::time::Duration;

use palaver_core::PalaverError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::WireTurn;

/// HTTP client for completion endpoint communication.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl CompletionClient {
    /// Creates a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, PalaverError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("palaver/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PalaverError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// PUTs `body` to the endpoint and returns the decoded JSON response.
    ///
    /// Status classes map onto [`PalaverError`]: 400, 404 and 5xx get their own
    /// variants; every other non-success status, transport failure, or
    /// undecodable body is [`PalaverError::UnknownNetwork`].
    pub async fn put_turns(
        &self,
        session_id: &str,
        app_code: &str,
        body: &[WireTurn],
    ) -> Result<Value, PalaverError> {
        let url = reqwest::Url::parse_with_params(
            &self.endpoint,
            &[("app_cd", app_code), ("request_id", session_id)],
        )
        .map_err(|e| PalaverError::Config(format!("invalid endpoint URL {}: {e}", self.endpoint)))?;

        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| PalaverError::UnknownNetwork {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, session_id, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, session_id, "completion request failed");
            return Err(PalaverError::from_status(status.as_u16()));
        }

        let text = response.text().await.map_err(|e| PalaverError::UnknownNetwork {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        serde_json::from_str(&text).map_err(|e| PalaverError::UnknownNetwork {
            message: format!("response body is not JSON: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
