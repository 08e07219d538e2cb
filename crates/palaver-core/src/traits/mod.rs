// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the session core and its environment.
//!
//! Backends use `#[async_trait]` for dynamic dispatch compatibility.

pub mod backend;

pub use backend::CompletionBackend;
