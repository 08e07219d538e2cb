// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Palaver chat client.

use thiserror::Error;

/// The primary error type used across the request pipeline, session controller,
/// and completion backends.
#[derive(Debug, Error)]
pub enum PalaverError {
    /// Input rejected before any network call (empty text, missing identifiers).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A submission is already outstanding for this session.
    #[error("a request is already in flight for this session")]
    Busy,

    /// The session was ended by inactivity and must be reset before use.
    #[error("session {session_id} has ended")]
    SessionEnded { session_id: String },

    /// The session was reset while the request was outstanding; the reply was dropped.
    #[error("session was reset before the reply arrived")]
    Superseded,

    /// The completion service answered with a 5xx status.
    #[error("completion service error (HTTP {status})")]
    Server { status: u16 },

    /// The completion endpoint answered 404.
    #[error("completion endpoint not found (HTTP 404)")]
    NotFound,

    /// The completion service rejected the request with 400.
    #[error("completion request rejected (HTTP 400)")]
    BadRequest,

    /// Any other non-success status, transport failure, or unreadable body.
    #[error("network error: {message}")]
    UnknownNetwork {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid endpoint, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PalaverError {
    /// Builds an [`UnknownNetwork`](Self::UnknownNetwork) error from a status code
    /// that matched no specific class.
    pub fn unexpected_status(status: u16) -> Self {
        Self::UnknownNetwork {
            message: format!("unexpected HTTP status {status}"),
            source: None,
        }
    }

    /// Classifies a non-success HTTP status into the error taxonomy.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            500..=599 => Self::Server { status },
            other => Self::unexpected_status(other),
        }
    }

    /// True for failures that came back from (or failed to reach) the completion service.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Server { .. } | Self::NotFound | Self::BadRequest | Self::UnknownNetwork { .. }
        )
    }

    /// Short text suitable for the chat panel's error line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(reason) => format!("Nothing sent: {reason}."),
            Self::Busy => "Please wait for the current reply before sending again.".to_string(),
            Self::SessionEnded { .. } => {
                "This chat has ended. Start a new chat to continue.".to_string()
            }
            Self::Superseded => "The chat was reset before the reply arrived.".to_string(),
            Self::Server { .. } => {
                "The chat service is having trouble right now. Please try again later.".to_string()
            }
            Self::NotFound => "The chat service could not be found.".to_string(),
            Self::BadRequest => "The chat service could not understand the request.".to_string(),
            Self::UnknownNetwork { .. } => {
                "Could not reach the chat service. Check your connection.".to_string()
            }
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::Internal(msg) => format!("Something went wrong: {msg}"),
        }
    }
}
