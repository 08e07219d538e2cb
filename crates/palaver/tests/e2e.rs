// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: a real HTTP backend against a mock completion server,
//! driven through the session controller.

use std::sync::Arc;

use palaver_client::HttpBackend;
use palaver_config::model::PalaverConfig;
use palaver_core::{PalaverError, Role};
use palaver_session::SessionController;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> PalaverConfig {
    palaver_config::load_and_validate_str(&format!(
        r#"
[endpoint]
url = "{}/chat/completions"
app_code = "APP42"
timeout_secs = 5
"#,
        server.uri()
    ))
    .expect("test config is valid")
}

fn controller_for(server: &MockServer) -> SessionController {
    let config = config_for(server);
    let backend = Arc::new(HttpBackend::new(&config.endpoint).unwrap());
    SessionController::from_config(backend, &config)
}

#[tokio::test]
async fn chat_round_trip_over_http() {
    let server = MockServer::start().await;
    let controller = controller_for(&server);
    let session_id = controller.session_id();

    Mock::given(method("PUT"))
        .and(path("/chat/completions"))
        .and(query_param("app_cd", "APP42"))
        .and(query_param("request_id", session_id.as_str()))
        .and(body_json(json!([{"role": "user", "content": "hello"}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"modelreply": "hi"})))
        .expect(1)
        .mount(&server)
        .await;

    let turn = controller.submit("  hello ").await.unwrap();

    assert_eq!(turn.content(), "hi");
    let transcript = controller.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role(), Role::User);
    assert_eq!(transcript[0].content(), "hello");
    assert_eq!(transcript[1].role(), Role::Assistant);
}

#[tokio::test]
async fn structured_reply_is_joined() {
    let server = MockServer::start().await;
    let controller = controller_for(&server);

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "modelreply": {"NAME": {"a": "foo", "b": "bar"}}
        })))
        .mount(&server)
        .await;

    let turn = controller.submit("list").await.unwrap();
    assert_eq!(turn.content(), "foo\nbar");
}

#[tokio::test]
async fn server_error_keeps_user_turn_only() {
    let server = MockServer::start().await;
    let controller = controller_for(&server);

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = controller.submit("hello").await.unwrap_err();

    assert!(matches!(err, PalaverError::Server { status: 502 }));
    assert!(err.is_network());
    let transcript = controller.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role(), Role::User);
    assert!(!controller.in_flight());
}

#[tokio::test]
async fn new_chat_sends_new_request_id() {
    let server = MockServer::start().await;
    let controller = controller_for(&server);

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"modelreply": "ok"})))
        .mount(&server)
        .await;

    controller.submit("one").await.unwrap();
    let fresh = controller.reset();
    controller.submit("two").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let ids: Vec<String> = requests
        .iter()
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "request_id")
                .map(|(_, v)| v.into_owned())
                .unwrap()
        })
        .collect();
    assert_ne!(ids[0], ids[1]);
    assert_eq!(ids[1], fresh.as_str());
}
