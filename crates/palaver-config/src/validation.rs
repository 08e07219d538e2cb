// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: endpoint scheme, timeout
//! ranges, and a recognized log level.

use crate::diagnostic::ConfigError;
use crate::model::PalaverConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// One year.
pub const MAX_INACTIVITY_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PalaverConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let url = config.endpoint.url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "endpoint.url must not be empty".to_string(),
        });
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("endpoint.url `{url}` must start with http:// or https://"),
        });
    } else if url.contains('?') {
        errors.push(ConfigError::Validation {
            message: format!(
                "endpoint.url `{url}` must not carry a query string; app_cd and request_id are added per request"
            ),
        });
    }

    if config.endpoint.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "endpoint.timeout_secs must be greater than 0".to_string(),
        });
    }

    let inactivity = config.session.inactivity_timeout_secs;
    if inactivity == 0 {
        errors.push(ConfigError::Validation {
            message: "session.inactivity_timeout_secs must be greater than 0".to_string(),
        });
    } else if inactivity > MAX_INACTIVITY_TIMEOUT_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.inactivity_timeout_secs {inactivity} exceeds the maximum of {MAX_INACTIVITY_TIMEOUT_SECS}"
            ),
        });
    }

    let level = config.shell.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "shell.log_level `{}` is not one of {}",
                config.shell.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.endpoint.app_code.trim().is_empty() {
        // Not fatal: the pipeline reports a validation failure per submit instead.
        tracing::debug!("endpoint.app_code is empty; submissions will be rejected");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
