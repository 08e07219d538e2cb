// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session controller: owns the session context, its inactivity monitor,
//! and the request pipeline, and exposes the user-facing lifecycle hooks.
//!
//! Lock order is always monitor, then session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use palaver_config::model::PalaverConfig;
use palaver_core::{CompletionBackend, PalaverError, SessionId, Turn};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::context::{SessionContext, SessionSnapshot, SharedSession};
use crate::events::{EventBus, SessionEvent};
use crate::monitor::{InactivityMonitor, MonitorState};
use crate::pipeline::RequestPipeline;

/// Drives one chat session at a time.
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct SessionController {
    session: SharedSession,
    pipeline: RequestPipeline,
    events: EventBus,
    inactivity_timeout: Duration,
    monitor: Mutex<InactivityMonitor>,
    /// Set by the first activity after a reset.
    engaged: AtomicBool,
}

impl SessionController {
    pub fn new(pipeline: RequestPipeline, inactivity_timeout: Duration) -> Self {
        let session = SharedSession::new(SessionContext::new());
        let events = EventBus::new();
        let monitor =
            InactivityMonitor::start(inactivity_timeout, session.clone(), events.clone());

        info!(
            session_id = %session.read(|ctx| ctx.id().clone()),
            inactivity_secs = inactivity_timeout.as_secs(),
            "session started"
        );

        Self {
            session,
            pipeline,
            events,
            inactivity_timeout,
            monitor: Mutex::new(monitor),
            engaged: AtomicBool::new(false),
        }
    }

    /// Wires a controller from the `[endpoint]` and `[session]` sections.
    pub fn from_config(backend: Arc<dyn CompletionBackend>, config: &PalaverConfig) -> Self {
        let pipeline = RequestPipeline::new(backend, config.endpoint.app_code.clone());
        Self::new(pipeline, config.session.inactivity_timeout())
    }

    /// Throws the current session away and starts a fresh one.
    pub fn reset(&self) -> SessionId {
        let mut monitor = self.lock_monitor();
        monitor.teardown();

        let session_id = self.session.update(SessionContext::renew);
        *monitor = InactivityMonitor::start(
            self.inactivity_timeout,
            self.session.clone(),
            self.events.clone(),
        );
        self.engaged.store(false, Ordering::SeqCst);
        drop(monitor);

        info!(session_id = %session_id, "session reset");
        self.events.publish(SessionEvent::Reset {
            session_id: session_id.clone(),
        });
        session_id
    }

    /// Records user activity. Returns `false` if the session has already ended.
    pub fn on_activity(&self) -> bool {
        if !self.lock_monitor().record_activity() {
            return false;
        }

        if !self.engaged.swap(true, Ordering::SeqCst) {
            let session_id = self.session_id();
            debug!(session_id = %session_id, "session engaged");
            self.events.publish(SessionEvent::Engaged { session_id });
        }
        true
    }

    /// Ends the session now. The transcript is kept; `Ended` is published
    /// only on the first transition.
    pub fn on_ended(&self) {
        let mut monitor = self.lock_monitor();
        monitor.finish();

        let ended = self
            .session
            .update(|ctx| ctx.mark_ended().then(|| ctx.id().clone()));
        drop(monitor);

        if let Some(session_id) = ended {
            info!(session_id = %session_id, "session ended");
            self.events.publish(SessionEvent::Ended { session_id });
        }
    }

    /// Submits user text. Non-blank text counts as activity first.
    pub async fn submit(&self, text: &str) -> Result<Turn, PalaverError> {
        if !text.trim().is_empty() {
            self.on_activity();
        }
        self.pipeline.submit(&self.session, text).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn session_id(&self) -> SessionId {
        self.session.read(|ctx| ctx.id().clone())
    }

    pub fn is_active(&self) -> bool {
        self.session.read(SessionContext::is_active)
    }

    pub fn in_flight(&self) -> bool {
        self.session.read(SessionContext::in_flight)
    }

    /// Cloned turns of the current transcript.
    pub fn transcript(&self) -> Vec<Turn> {
        self.session.read(|ctx| ctx.transcript().all().to_vec())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn monitor_state(&self) -> MonitorState {
        self.lock_monitor().state()
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    fn lock_monitor(&self) -> MutexGuard<'_, InactivityMonitor> {
        self.monitor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
