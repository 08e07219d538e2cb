// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the completion endpoint and the reply extraction policy.

use palaver_core::{Role, Turn};
use serde::Serialize;
use serde_json::Value;

/// Text used when the response carries no usable reply.
pub const NO_VALID_REPLY: &str = "No valid reply found.";

/// Response field holding the model's answer.
const REPLY_FIELD: &str = "modelreply";

/// Field inside a structured reply whose values make up the answer.
const NAME_FIELD: &str = "NAME";

/// One element of the request body array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for WireTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            content: turn.content().to_string(),
        }
    }
}

/// Builds the request body: a JSON array holding exactly the new turn.
pub fn request_body(turn: &Turn) -> Vec<WireTurn> {
    vec![WireTurn::from(turn)]
}

/// Extracts the reply text from a decoded response body.
///
/// - `modelreply` is a string: returned verbatim.
/// - `modelreply` is an object whose `NAME` is an object of strings: those
///   strings, in document order, joined with `\n`.
/// - anything else (including a missing field, a `NAME` that is not an
///   object, or a `NAME` value that is not a string): [`NO_VALID_REPLY`].
pub fn extract_reply(body: &Value) -> String {
    match body.get(REPLY_FIELD) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Object(reply)) => match reply.get(NAME_FIELD).and_then(join_name_values) {
            Some(text) => text,
            None => NO_VALID_REPLY.to_string(),
        },
        _ => NO_VALID_REPLY.to_string(),
    }
}

fn join_name_values(name: &Value) -> Option<String> {
    let Value::Object(map) = name else {
        return None;
    };
    let parts = map
        .values()
        .map(Value::as_str)
        .collect::<Option<Vec<&str>>>()?;
    Some(parts.join("\n"))
}
