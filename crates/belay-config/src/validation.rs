// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as hex key shapes and non-zero limits.

use crate::diagnostic::ConfigError;
use crate::model::BelayConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must not be 0".to_string(),
        });
    }

    if config.kv.enabled && config.kv.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "kv.database_path must not be empty when kv.enabled is true".to_string(),
        });
    }

    if config.moderation.max_emails_per_day == 0 {
        errors.push(ConfigError::Validation {
            message: "moderation.max_emails_per_day must be at least 1".to_string(),
        });
    }

    if config.moderation.max_email_size_kb == 0 {
        errors.push(ConfigError::Validation {
            message: "moderation.max_email_size_kb must be at least 1".to_string(),
        });
    }

    // An interaction public key must be a 32-byte hex string; a malformed
    // key would otherwise reject every callback at runtime with no hint why.
    if let Some(key) = &config.discord.public_key {
        match hex::decode(key) {
            Ok(bytes) if bytes.len() == 32 => {}
            Ok(bytes) => errors.push(ConfigError::Validation {
                message: format!(
                    "discord.public_key must decode to 32 bytes, got {}",
                    bytes.len()
                ),
            }),
            Err(_) => errors.push(ConfigError::Validation {
                message: "discord.public_key must be a hex string".to_string(),
            }),
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BelayConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = BelayConfig::default();
        config.server.port = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("server.port")));
    }

    #[test]
    fn short_public_key_is_rejected() {
        let mut config = BelayConfig::default();
        config.discord.public_key = Some("abcd".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("32 bytes")));
    }

    #[test]
    fn non_hex_public_key_is_rejected() {
        let mut config = BelayConfig::default();
        config.discord.public_key = Some("not-hex!".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = BelayConfig::default();
        config.server.port = 0;
        config.moderation.max_emails_per_day = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
