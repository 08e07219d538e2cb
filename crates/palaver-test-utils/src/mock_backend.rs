// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion backend for deterministic testing.
//!
//! `MockBackend` implements `CompletionBackend` with scripted outcomes,
//! enabling fast, CI-runnable tests without a completion service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{watch, Semaphore};
use tracing::trace;

use palaver_core::{CompletionBackend, CompletionRequest, PalaverError};

/// Reply used when the script is exhausted.
pub const DEFAULT_REPLY: &str = "mock reply";

/// One scripted outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Successful reply text.
    Text(String),
    /// Non-success HTTP status, classified like the real backend does.
    Status(u16),
    /// Transport failure (connection refused, timeout).
    Transport(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn into_result(self) -> Result<String, PalaverError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Status(status) => Err(PalaverError::from_status(status)),
            Self::Transport(message) => Err(PalaverError::UnknownNetwork {
                message,
                source: None,
            }),
        }
    }
}

/// A completion backend that answers from a FIFO script.
///
/// When the script is empty, [`DEFAULT_REPLY`] is returned.
#[derive(Debug)]
pub struct MockBackend {
    replies: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<CompletionRequest>>,
    call_count: watch::Sender<usize>,
    gate: Option<Arc<Semaphore>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_replies([])
    }

    /// Create a backend pre-loaded with the given outcomes.
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            call_count: watch::channel(0).0,
            gate: None,
        }
    }

    /// Hold every reply until [`release`](Self::release) lets it through.
    /// Calls are still recorded as soon as they arrive.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `n` held replies complete. No-op on an ungated backend.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Append an outcome to the script.
    pub fn push_reply(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.borrow()
    }

    /// Resolves once at least `n` calls have been received.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.call_count.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    fn next_reply(&self) -> MockReply {
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| MockReply::text(DEFAULT_REPLY))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, PalaverError> {
        trace!(session_id = %request.session_id, "mock backend received request");
        lock(&self.calls).push(request);
        self.call_count.send_modify(|count| *count += 1);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| PalaverError::Internal(format!("mock gate closed: {e}")))?
                .forget();
        }

        self.next_reply().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::{SessionId, Turn};

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest {
            session_id: SessionId("s1".into()),
            app_code: "APP".into(),
            turn: Turn::user(text),
        }
    }

    #[tokio::test]
    async fn default_reply_when_script_empty() {
        let backend = MockBackend::new();
        let reply = backend.complete(request("hi")).await.unwrap();
        assert_eq!(reply, DEFAULT_REPLY);
    }

    #[tokio::test]
    async fn scripted_outcomes_in_order() {
        let backend = MockBackend::with_replies([
            MockReply::text("first"),
            MockReply::Status(500),
            MockReply::Transport("refused".into()),
        ]);
        backend.push_reply(MockReply::Status(400));

        assert_eq!(backend.complete(request("a")).await.unwrap(), "first");
        assert!(matches!(
            backend.complete(request("b")).await,
            Err(PalaverError::Server { status: 500 })
        ));
        assert!(matches!(
            backend.complete(request("c")).await,
            Err(PalaverError::UnknownNetwork { .. })
        ));
        assert!(matches!(
            backend.complete(request("d")).await,
            Err(PalaverError::BadRequest)
        ));
        assert_eq!(backend.complete(request("e")).await.unwrap(), DEFAULT_REPLY);
    }

    #[tokio::test]
    async fn records_calls() {
        let backend = MockBackend::new();
        backend.complete(request("one")).await.unwrap();
        backend.complete(request("two")).await.unwrap();

        let calls = backend.calls();
        assert_eq!(backend.call_count(), 2);
        assert_eq!(calls[0].turn.content(), "one");
        assert_eq!(calls[1].turn.content(), "two");
    }

    #[tokio::test]
    async fn gate_holds_reply_until_released() {
        let backend = Arc::new(MockBackend::with_replies([MockReply::text("held")]).gated());

        let task = {
            let backend = backend.clone();
            tokio::spawn(async move { backend.complete(request("hi")).await })
        };
        backend.wait_for_calls(1).await;
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        backend.release(1);
        assert_eq!(task.await.unwrap().unwrap(), "held");
    }
}
