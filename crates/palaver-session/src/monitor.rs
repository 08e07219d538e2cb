// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inactivity monitor: a two-state timer that ends an idle session.
//!
//! The monitor starts `Active` with a countdown running. Every activity event
//! cancels the countdown and starts a new one. If a countdown runs out, the
//! monitor appends [`SESSION_ENDED_NOTICE`] to the transcript, marks the
//! session inactive, publishes [`SessionEvent::Ended`], and stays `Ended` for
//! good. Dropping the monitor cancels any pending countdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use palaver_core::{Turn, SESSION_ENDED_NOTICE};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::context::SharedSession;
use crate::events::{EventBus, SessionEvent};

/// Deadline used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Monitor states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Active,
    Ended,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Active => write!(f, "active"),
            MonitorState::Ended => write!(f, "ended"),
        }
    }
}

/// Watches one session for inactivity.
///
/// Must be created inside a Tokio runtime; each countdown is a spawned task.
#[derive(Debug)]
pub struct InactivityMonitor {
    timeout: Duration,
    session: SharedSession,
    events: EventBus,
    /// Session epoch this monitor belongs to.
    epoch: u64,
    ended: Arc<AtomicBool>,
    countdown: Option<CancellationToken>,
}

impl InactivityMonitor {
    /// Creates an `Active` monitor for the session's current epoch and arms
    /// the first countdown.
    pub fn start(timeout: Duration, session: SharedSession, events: EventBus) -> Self {
        let epoch = session.read(|ctx| ctx.epoch());
        let mut monitor = Self {
            timeout,
            session,
            events,
            epoch,
            ended: Arc::new(AtomicBool::new(false)),
            countdown: None,
        };
        monitor.arm();
        monitor
    }

    pub fn state(&self) -> MonitorState {
        if self.ended.load(Ordering::SeqCst) {
            MonitorState::Ended
        } else {
            MonitorState::Active
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `Active -> Active`: restart the countdown.
    ///
    /// Returns `false` (and does nothing) once the monitor has ended.
    pub fn record_activity(&mut self) -> bool {
        // Cancel under the session lock: an expiring countdown re-checks its
        // token under the same lock, so it cannot fire after this point.
        let previous = self.countdown.take();
        let ended = &self.ended;
        let still_active = self.session.read(|_| {
            if let Some(token) = &previous {
                token.cancel();
            }
            !ended.load(Ordering::SeqCst)
        });
        if !still_active {
            debug!(epoch = self.epoch, "activity ignored: monitor has ended");
            return false;
        }
        self.arm();
        true
    }

    /// Ends the monitor without appending a notice and cancels its countdown.
    pub fn finish(&mut self) {
        self.ended.store(true, Ordering::SeqCst);
        self.teardown();
    }

    /// Cancels the pending countdown, if any.
    pub fn teardown(&mut self) {
        if let Some(token) = self.countdown.take() {
            token.cancel();
        }
    }

    fn arm(&mut self) {
        self.teardown();

        let token = CancellationToken::new();
        self.countdown = Some(token.clone());

        let now = Instant::now();
        let deadline = now
            .checked_add(self.timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);

        tokio::spawn(countdown(
            deadline,
            self.timeout,
            token,
            self.session.clone(),
            self.events.clone(),
            self.epoch,
            self.ended.clone(),
        ));
    }
}

impl Drop for InactivityMonitor {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn countdown(
    deadline: Instant,
    timeout: Duration,
    token: CancellationToken,
    session: SharedSession,
    events: EventBus,
    epoch: u64,
    ended: Arc<AtomicBool>,
) {
    tokio::select! {
        _ = token.cancelled() => return,
        _ = tokio::time::sleep_until(deadline) => {}
    }

    let expired = session.update(|ctx| {
        if token.is_cancelled() || ctx.epoch() != epoch || ended.swap(true, Ordering::SeqCst) {
            return None;
        }
        ctx.append(Turn::system(SESSION_ENDED_NOTICE));
        ctx.mark_ended();
        Some(ctx.id().clone())
    });

    if let Some(session_id) = expired {
        info!(
            session_id = %session_id,
            idle_secs = timeout.as_secs(),
            "session ended after inactivity"
        );
        events.publish(SessionEvent::Ended { session_id });
    }
}
