// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Belay configuration system.

use belay_config::model::BelayConfig;
use belay_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_belay_config() {
    let toml = r#"
[service]
name = "belay-test"
log_level = "debug"

[server]
host = "0.0.0.0"
port = 9000

[kv]
enabled = true
database_path = "/tmp/belay-test.db"

[moderation]
max_emails_per_day = 5
max_email_size_kb = 50

[gemini]
api_key = "AIza-test"
model = "gemini-2.0-flash-exp"

[discord]
bot_token = "bot-123"
approval_channel_id = "111"
route_channel_id = "222"
log_webhook_url = "https://discord.com/api/webhooks/x/y"

[resend]
api_key = "re_test"

[worker]
api_key = "shared-secret"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "belay-test");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.kv.database_path, "/tmp/belay-test.db");
    assert_eq!(config.moderation.max_emails_per_day, 5);
    assert_eq!(config.gemini.api_key.as_deref(), Some("AIza-test"));
    assert_eq!(config.discord.bot_token.as_deref(), Some("bot-123"));
    assert_eq!(config.resend.api_key.as_deref(), Some("re_test"));
    assert_eq!(config.worker.api_key.as_deref(), Some("shared-secret"));
}

/// Empty config falls back to compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    let defaults = BelayConfig::default();
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.moderation.max_emails_per_day, 10);
    assert_eq!(config.moderation.max_email_size_kb, 100);
    assert!(config.gemini.api_key.is_none());
    assert!(config.discord.bot_token.is_none());
    assert_eq!(config.resend.api_base, "https://api.resend.com");
}

/// Unknown keys are rejected at load time.
#[test]
fn unknown_key_is_rejected() {
    let toml = r#"
[server]
prot = 9000
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Validation errors surface through load_and_validate_str.
#[test]
fn invalid_public_key_fails_validation() {
    let toml = r#"
[discord]
public_key = "zz-not-hex"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| e.to_string().contains("discord.public_key"))
    );
}

/// A well-formed 32-byte hex public key passes validation.
#[test]
fn valid_public_key_passes_validation() {
    let key = "ab".repeat(32);
    let toml = format!("[discord]\npublic_key = \"{key}\"\n");
    let config = load_and_validate_str(&toml).expect("should validate");
    assert_eq!(config.discord.public_key.as_deref(), Some(key.as_str()));
}
