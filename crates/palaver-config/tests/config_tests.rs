// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Palaver configuration system.

use std::io::Write;

use palaver_config::diagnostic::ConfigError;
use palaver_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[shell]
name = "helpdesk"
log_level = "debug"
show_timestamps = true

[endpoint]
url = "https://chat.example.com/api/completion"
app_code = "HELPDESK"
timeout_secs = 15

[session]
inactivity_timeout_secs = 60
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.shell.name, "helpdesk");
    assert_eq!(config.shell.log_level, "debug");
    assert!(config.shell.show_timestamps);
    assert_eq!(config.endpoint.url, "https://chat.example.com/api/completion");
    assert_eq!(config.endpoint.app_code, "HELPDESK");
    assert_eq!(config.endpoint.timeout_secs, 15);
    assert_eq!(config.session.inactivity_timeout_secs, 60);
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.session.inactivity_timeout_secs, 1800);
    assert_eq!(config.endpoint.timeout_secs, 120);
}

/// A typo in a key is reported as an unknown key with a suggestion.
#[test]
fn typo_produces_unknown_key_with_suggestion() {
    let toml = r#"
[endpoint]
app_cod = "HELPDESK"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "app_cod" && s == "app_code"
        )
    });
    assert!(found, "expected unknown key diagnostic, got: {errors:?}");
}

/// A string where a number is expected is reported as a type error.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[session]
inactivity_timeout_secs = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("inactivity_timeout_secs"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[endpoint]
url = "chat.example.com"
timeout_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// A timeout too large to schedule is rejected before any session starts.
#[test]
fn oversized_inactivity_timeout_is_rejected() {
    let toml = r#"
[endpoint]
app_code = "A"

[session]
inactivity_timeout_secs = 9223372036854775807
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 1, "got: {errors:?}");
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("inactivity_timeout_secs")));
}

/// Loading from an explicit path works end to end.
#[test]
fn explicit_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[endpoint]\napp_code = \"FROM_PATH\"").unwrap();

    let config = load_and_validate_path(file.path()).expect("file config should load");
    assert_eq!(config.endpoint.app_code, "FROM_PATH");
}
