// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion backend trait implemented by the HTTP client and test mocks.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::types::CompletionRequest;

/// A remote service that turns one user turn into assistant reply text.
///
/// Implementations must classify failures into the network variants of
/// [`PalaverError`] (`Server`, `NotFound`, `BadRequest`, `UnknownNetwork`)
/// and must not retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Sends the request and returns the extracted reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, PalaverError>;
}
