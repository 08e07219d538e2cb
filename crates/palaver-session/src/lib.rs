// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session lifecycle for Palaver.
//!
//! A [`SessionController`] owns one [`SharedSession`] (id, active flag,
//! transcript), an [`InactivityMonitor`] that ends the session after a quiet
//! period, and a [`RequestPipeline`] that sends user turns to a
//! [`CompletionBackend`](palaver_core::CompletionBackend). Lifecycle changes
//! are published as [`SessionEvent`]s.

pub mod context;
pub mod controller;
pub mod events;
pub mod monitor;
pub mod pipeline;

pub use context::{SessionContext, SessionSnapshot, SharedSession};
pub use controller::SessionController;
pub use events::{EventBus, SessionEvent};
pub use monitor::{InactivityMonitor, MonitorState};
pub use pipeline::RequestPipeline;
