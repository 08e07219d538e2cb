// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Palaver chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Palaver configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PalaverConfig {
    /// Terminal shell presentation settings.
    #[serde(default)]
    pub shell: ShellConfig,

    /// Remote completion endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Terminal shell presentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Title printed in the shell banner.
    #[serde(default = "default_shell_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Print a timestamp next to each rendered turn.
    #[serde(default)]
    pub show_timestamps: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            name: default_shell_name(),
            log_level: default_log_level(),
            show_timestamps: false,
        }
    }
}

fn default_shell_name() -> String {
    "palaver".to_string()
}

fn default_log_level() -> String {
    // Interactive use: keep the prompt free of info chatter.
    "warn".to_string()
}

/// Remote completion endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Full URL of the completion endpoint (query parameters are appended).
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Application code sent as `app_cd`. Submissions fail validation while empty.
    #[serde(default)]
    pub app_code: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            app_code: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_endpoint_url() -> String {
    "http://127.0.0.1:8000/chat/completions".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Session lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Seconds without user activity before the session ends.
    /// Set to 60 when debugging the timeout path.
    #[serde(default = "default_inactivity_timeout_secs")]
    pub inactivity_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: default_inactivity_timeout_secs(),
        }
    }
}

impl SessionConfig {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

fn default_inactivity_timeout_secs() -> u64 {
    1800 // 30 minutes
}
