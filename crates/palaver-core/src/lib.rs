// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Palaver chat client.
//!
//! This crate provides the conversation data model, the transcript store, the
//! error taxonomy, and the [`CompletionBackend`] trait that the request pipeline
//! drives.

pub mod error;
pub mod traits;
pub mod transcript;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PalaverError;
pub use traits::CompletionBackend;
pub use transcript::Transcript;
pub use types::{CompletionRequest, Role, SessionId, Turn, SESSION_ENDED_NOTICE};
