// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session context: id, active flag, transcript, and in-flight marker,
//! behind one lock shared by the controller, pipeline, and monitor.
//!
//! The lock is a `std::sync::Mutex` and is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use palaver_core::{SessionId, Transcript, Turn};

/// State of one conversational context.
#[derive(Debug)]
pub struct SessionContext {
    id: SessionId,
    active: bool,
    transcript: Transcript,
    in_flight: bool,
    /// Bumped on every reset; work started under an older epoch must not
    /// touch the current transcript.
    epoch: u64,
}

impl SessionContext {
    /// A fresh, active session with a newly minted id.
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            active: true,
            transcript: Transcript::new(),
            in_flight: false,
            epoch: 0,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn append(&mut self, turn: Turn) {
        self.transcript.append(turn);
    }

    pub(crate) fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }

    /// Replace this session wholesale: new id, empty transcript, active.
    pub(crate) fn renew(&mut self) -> SessionId {
        self.id = SessionId::generate();
        self.active = true;
        self.transcript.clear();
        self.in_flight = false;
        self.epoch += 1;
        self.id.clone()
    }

    /// Flip to inactive. Returns `false` if the session had already ended.
    pub(crate) fn mark_ended(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub active: bool,
    pub turns: Vec<Turn>,
}

/// Cloneable handle to a [`SessionContext`].
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<SessionContext>>,
}

impl SharedSession {
    pub fn new(context: SessionContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(context)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionContext> {
        // Mutations are single-step, so a poisoned context is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with shared access to the context.
    pub fn read<R>(&self, f: impl FnOnce(&SessionContext) -> R) -> R {
        f(&self.lock())
    }

    /// Runs `f` with exclusive access to the context.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.read(|ctx| SessionSnapshot {
            id: ctx.id.clone(),
            active: ctx.active,
            turns: ctx.transcript.all().to_vec(),
        })
    }
}
