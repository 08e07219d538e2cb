// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request pipeline: turns one line of user text into a user turn, a backend
//! call, and (on success) an assistant turn.

use std::sync::Arc;
use std::time::Instant;

use palaver_core::{CompletionBackend, CompletionRequest, PalaverError, Turn};
use tracing::{debug, info, warn};

use crate::context::SharedSession;

/// Submits user text for one session against a completion backend.
#[derive(Clone)]
pub struct RequestPipeline {
    backend: Arc<dyn CompletionBackend>,
    app_code: String,
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("backend", &self.backend.name())
            .field("app_code", &self.app_code)
            .finish()
    }
}

impl RequestPipeline {
    pub fn new(backend: Arc<dyn CompletionBackend>, app_code: impl Into<String>) -> Self {
        Self {
            backend,
            app_code: app_code.into(),
        }
    }

    /// Appends the trimmed user turn, calls the backend, and appends the
    /// assistant turn it returns.
    ///
    /// Nothing is appended and no call is made when validation fails or the
    /// session is ended or busy. A failed call leaves only the user turn. A
    /// reply that arrives after the session was reset is dropped with
    /// [`PalaverError::Superseded`].
    pub async fn submit(&self, session: &SharedSession, text: &str) -> Result<Turn, PalaverError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PalaverError::Validation("message is empty".into()));
        }
        if self.app_code.trim().is_empty() {
            return Err(PalaverError::Validation(
                "no application code is configured".into(),
            ));
        }

        let (request, epoch) = session.update(|ctx| {
            if ctx.id().as_str().is_empty() {
                return Err(PalaverError::Validation("session id is empty".into()));
            }
            if !ctx.is_active() {
                return Err(PalaverError::SessionEnded {
                    session_id: ctx.id().to_string(),
                });
            }
            if ctx.in_flight() {
                return Err(PalaverError::Busy);
            }

            let turn = Turn::user(text);
            ctx.append(turn.clone());
            ctx.set_in_flight(true);
            let request = CompletionRequest {
                session_id: ctx.id().clone(),
                app_code: self.app_code.clone(),
                turn,
            };
            Ok((request, ctx.epoch()))
        })?;
        let _guard = InFlightGuard {
            session: session.clone(),
            epoch,
        };

        let session_id = request.session_id.clone();
        debug!(
            session_id = %session_id,
            backend = self.backend.name(),
            text_len = text.len(),
            "submitting user turn"
        );

        let started = Instant::now();
        let reply = match self.backend.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    session_id = %session_id,
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "completion failed"
                );
                return Err(e);
            }
        };

        session.update(|ctx| {
            if ctx.epoch() != epoch {
                info!(session_id = %session_id, "reply dropped: session was reset");
                return Err(PalaverError::Superseded);
            }
            let turn = Turn::assistant(reply);
            ctx.append(turn.clone());
            info!(
                session_id = %session_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "assistant turn appended"
            );
            Ok(turn)
        })
    }
}

/// Clears the in-flight marker on every exit path of a submission, unless the
/// session has since been reset.
struct InFlightGuard {
    session: SharedSession,
    epoch: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let epoch = self.epoch;
        self.session.update(|ctx| {
            if ctx.epoch() == epoch {
                ctx.set_in_flight(false);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::Role;
    use palaver_test_utils::{MockBackend, MockReply};
    use tracing_test::traced_test;

    use crate::context::SessionContext;

    fn pipeline(backend: &Arc<MockBackend>) -> RequestPipeline {
        RequestPipeline::new(backend.clone(), "APP")
    }

    fn roles(session: &SharedSession) -> Vec<Role> {
        session.snapshot().turns.iter().map(Turn::role).collect()
    }

    #[tokio::test]
    async fn success_appends_user_then_assistant() {
        let backend = Arc::new(MockBackend::with_replies([MockReply::text("hi")]));
        let session = SharedSession::new(SessionContext::new());

        let turn = pipeline(&backend).submit(&session, "  hello  ").await.unwrap();

        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(turn.content(), "hi");
        let snap = session.snapshot();
        assert_eq!(snap.turns.len(), 2);
        assert_eq!(snap.turns[0].content(), "hello");
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].turn.content(), "hello");
        assert_eq!(calls[0].app_code, "APP");
        assert_eq!(calls[0].session_id, snap.id);
    }

    #[tokio::test]
    async fn user_turn_is_visible_while_reply_is_pending() {
        let backend = Arc::new(MockBackend::with_replies([MockReply::text("late")]).gated());
        let session = SharedSession::new(SessionContext::new());

        let task = {
            let pipeline = pipeline(&backend);
            let session = session.clone();
            tokio::spawn(async move { pipeline.submit(&session, "hello").await })
        };
        backend.wait_for_calls(1).await;

        assert_eq!(roles(&session), vec![Role::User]);
        assert!(session.read(SessionContext::in_flight));

        backend.release(1);
        task.await.unwrap().unwrap();

        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
        assert!(!session.read(SessionContext::in_flight));
    }

    #[tokio::test]
    async fn overlapping_submit_is_busy() {
        let backend = Arc::new(MockBackend::new().gated());
        let session = SharedSession::new(SessionContext::new());
        let pipeline = pipeline(&backend);

        let task = {
            let pipeline = pipeline.clone();
            let session = session.clone();
            tokio::spawn(async move { pipeline.submit(&session, "first").await })
        };
        backend.wait_for_calls(1).await;

        let err = pipeline.submit(&session, "second").await.unwrap_err();
        assert!(matches!(err, PalaverError::Busy));

        backend.release(1);
        task.await.unwrap().unwrap();
        assert_eq!(backend.call_count(), 1);
        assert_eq!(session.snapshot().turns.len(), 2);
    }

    #[tokio::test]
    async fn reply_after_reset_is_superseded() {
        let backend = Arc::new(MockBackend::with_replies([MockReply::text("stale")]).gated());
        let session = SharedSession::new(SessionContext::new());

        let task = {
            let pipeline = pipeline(&backend);
            let session = session.clone();
            tokio::spawn(async move { pipeline.submit(&session, "hello").await })
        };
        backend.wait_for_calls(1).await;

        session.update(SessionContext::renew);
        backend.release(1);

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, PalaverError::Superseded));
        assert!(session.snapshot().turns.is_empty());
        assert!(!session.read(SessionContext::in_flight));
    }

    #[tokio::test]
    async fn whitespace_is_rejected_without_a_call() {
        let backend = Arc::new(MockBackend::new());
        let session = SharedSession::new(SessionContext::new());

        for text in ["", "   ", "\n\t "] {
            let err = pipeline(&backend).submit(&session, text).await.unwrap_err();
            assert!(matches!(err, PalaverError::Validation(_)));
        }

        assert_eq!(backend.call_count(), 0);
        assert!(session.snapshot().turns.is_empty());
    }

    #[tokio::test]
    async fn missing_app_code_is_rejected() {
        let backend = Arc::new(MockBackend::new());
        let session = SharedSession::new(SessionContext::new());

        let err = RequestPipeline::new(backend.clone(), "")
            .submit(&session, "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, PalaverError::Validation(_)));
        assert_eq!(backend.call_count(), 0);
        assert!(session.snapshot().turns.is_empty());
    }

    #[tokio::test]
    async fn ended_session_rejects_submit() {
        let backend = Arc::new(MockBackend::new());
        let session = SharedSession::new(SessionContext::new());
        session.update(SessionContext::mark_ended);

        let err = pipeline(&backend).submit(&session, "hello").await.unwrap_err();

        assert!(matches!(err, PalaverError::SessionEnded { .. }));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn failure_keeps_only_the_user_turn() {
        let backend = Arc::new(MockBackend::with_replies([MockReply::Status(404)]));
        let session = SharedSession::new(SessionContext::new());

        let err = pipeline(&backend).submit(&session, "hello").await.unwrap_err();

        assert!(matches!(err, PalaverError::NotFound));
        assert_eq!(roles(&session), vec![Role::User]);
        assert!(!session.read(SessionContext::in_flight));
        assert!(logs_contain("completion failed"));
    }

    #[tokio::test]
    async fn session_accepts_next_submit_after_failure() {
        let backend = Arc::new(MockBackend::with_replies([
            MockReply::Status(503),
            MockReply::text("recovered"),
        ]));
        let session = SharedSession::new(SessionContext::new());
        let pipeline = pipeline(&backend);

        let err = pipeline.submit(&session, "one").await.unwrap_err();
        assert!(matches!(err, PalaverError::Server { status: 503 }));

        let turn = pipeline.submit(&session, "two").await.unwrap();
        assert_eq!(turn.content(), "recovered");
        assert_eq!(
            roles(&session),
            vec![Role::User, Role::User, Role::Assistant]
        );
    }

    #[tokio::test]
    async fn empty_reply_is_kept_verbatim() {
        let backend = Arc::new(MockBackend::with_replies([MockReply::text("")]));
        let session = SharedSession::new(SessionContext::new());

        let turn = pipeline(&backend).submit(&session, "hello").await.unwrap();

        assert_eq!(turn.content(), "");
        assert_eq!(session.snapshot().turns.len(), 2);
    }
}
