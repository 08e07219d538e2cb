// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed broadcast channel for session lifecycle events.
//!
//! The shell subscribes to these to decide when to show the initial view and
//! when to print the ended notice.

use palaver_core::SessionId;
use tokio::sync::broadcast;
use tracing::trace;

const EVENT_CAPACITY: usize = 64;

/// Lifecycle signals emitted by the session controller and inactivity monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fresh session replaced the old one; show the initial/empty view.
    Reset { session_id: SessionId },
    /// First user activity in this session; hide the initial/empty view.
    Engaged { session_id: SessionId },
    /// The session ended (inactivity or explicit end).
    Ended { session_id: SessionId },
}

/// Cloneable publisher; every clone feeds the same set of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Sends to current subscribers. Having none is not an error.
    pub fn publish(&self, event: SessionEvent) {
        match self.tx.send(event) {
            Ok(receivers) => trace!(receivers, "session event published"),
            Err(broadcast::error::SendError(event)) => {
                trace!(?event, "session event dropped: no subscribers");
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
