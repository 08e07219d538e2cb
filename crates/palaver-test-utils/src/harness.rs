// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end session testing.
//!
//! `TestHarness` assembles a [`SessionController`] over a [`MockBackend`]
//! from a validated [`PalaverConfig`], and provides `send()` to drive the
//! full submit path in tests.

use std::sync::Arc;
use std::time::Duration;

use palaver_config::model::{EndpointConfig, PalaverConfig, SessionConfig};
use palaver_config::validation::validate_config;
use palaver_core::{PalaverError, Turn};
use palaver_session::SessionController;

use crate::mock_backend::{MockBackend, MockReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    app_code: String,
    inactivity_timeout_secs: u64,
    gated: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            app_code: "TEST".to_string(),
            inactivity_timeout_secs: 60,
            gated: false,
        }
    }

    /// Set the scripted backend outcomes.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Set the application code sent with every request.
    pub fn with_app_code(mut self, app_code: impl Into<String>) -> Self {
        self.app_code = app_code.into();
        self
    }

    /// Set the inactivity timeout in seconds.
    pub fn with_inactivity_timeout_secs(mut self, secs: u64) -> Self {
        self.inactivity_timeout_secs = secs;
        self
    }

    /// Hold backend replies until `harness.backend.release(n)`.
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    /// Build the harness. Must be awaited inside a Tokio runtime.
    pub async fn build(self) -> Result<TestHarness, PalaverError> {
        let config = PalaverConfig {
            endpoint: EndpointConfig {
                app_code: self.app_code,
                ..EndpointConfig::default()
            },
            session: SessionConfig {
                inactivity_timeout_secs: self.inactivity_timeout_secs,
            },
            ..PalaverConfig::default()
        };
        validate_config(&config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            PalaverError::Config(messages.join("; "))
        })?;

        let backend = MockBackend::with_replies(self.replies);
        let backend = Arc::new(if self.gated { backend.gated() } else { backend });
        let controller = SessionController::from_config(backend.clone(), &config);

        Ok(TestHarness {
            backend,
            controller,
            config,
        })
    }
}

/// A session controller wired to a mock backend.
pub struct TestHarness {
    pub backend: Arc<MockBackend>,
    pub controller: SessionController,
    pub config: PalaverConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Submit user text through the controller.
    pub async fn send(&self, text: &str) -> Result<Turn, PalaverError> {
        self.controller.submit(text).await
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.controller.inactivity_timeout()
    }
}
