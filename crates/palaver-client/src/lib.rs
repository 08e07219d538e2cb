// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP completion backend for the Palaver chat client.
//!
//! This crate implements [`CompletionBackend`] for the remote completion
//! endpoint: one PUT per user turn, session and app identifiers in the query
//! string, and reply text extracted from the `modelreply` field.

pub mod client;
pub mod types;

use async_trait::async_trait;
use palaver_config::model::EndpointConfig;
use palaver_core::{CompletionBackend, CompletionRequest, PalaverError};
use tracing::{debug, info};

use crate::client::CompletionClient;
use crate::types::{extract_reply, request_body};

/// Completion backend that talks to the configured HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: CompletionClient,
}

impl HttpBackend {
    /// Creates a backend from the `[endpoint]` configuration section.
    pub fn new(config: &EndpointConfig) -> Result<Self, PalaverError> {
        let client = CompletionClient::new(config.url.clone(), config.timeout())?;
        info!(endpoint = %config.url, "HTTP completion backend initialized");
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, PalaverError> {
        let body = self
            .client
            .put_turns(
                request.session_id.as_str(),
                &request.app_code,
                &request_body(&request.turn),
            )
            .await?;

        let reply = extract_reply(&body);
        debug!(
            session_id = %request.session_id,
            reply_len = reply.len(),
            "reply extracted"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::{SessionId, Turn};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::types::NO_VALID_REPLY;

    fn backend(server: &MockServer) -> HttpBackend {
        let config = EndpointConfig {
            url: format!("{}/completion", server.uri()),
            app_code: "APP".into(),
            timeout_secs: 5,
        };
        HttpBackend::new(&config).unwrap()
    }

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest {
            session_id: SessionId("abc".into()),
            app_code: "APP".into(),
            turn: Turn::user(text),
        }
    }

    async fn reply_for(body: serde_json::Value) -> String {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(query_param("request_id", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        backend(&server).complete(request("hello")).await.unwrap()
    }

    #[tokio::test]
    async fn string_reply() {
        let reply = reply_for(serde_json::json!({"modelreply": "hi"})).await;
        assert_eq!(reply, "hi");
    }

    #[tokio::test]
    async fn structured_reply_keeps_wire_order() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"modelreply": {"NAME": {"b": "first", "a": "second"}}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let reply = backend(&server).complete(request("hello")).await.unwrap();
        assert_eq!(reply, "first\nsecond");
    }

    #[tokio::test]
    async fn unusable_reply_falls_back() {
        let reply = reply_for(serde_json::json!({"modelreply": 42})).await;
        assert_eq!(reply, NO_VALID_REPLY);
    }

    #[tokio::test]
    async fn backend_name() {
        let server = MockServer::start().await;
        assert_eq!(backend(&server).name(), "http");
    }
}
