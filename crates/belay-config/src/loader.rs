// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./belay.toml` > `~/.config/belay/belay.toml` >
//! `/etc/belay/belay.toml` with environment variable overrides via the
//! `BELAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BelayConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/belay/belay.toml` (system-wide)
/// 3. `~/.config/belay/belay.toml` (user XDG config)
/// 4. `./belay.toml` (local directory)
/// 5. `BELAY_*` environment variables
pub fn load_config() -> Result<BelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BelayConfig::default()))
        .merge(Toml::file("/etc/belay/belay.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("belay/belay.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("belay.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BelayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BELAY_DISCORD_BOT_TOKEN` must map to
/// `discord.bot_token`, not `discord.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("BELAY_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("kv_", "kv.", 1)
            .replacen("moderation_", "moderation.", 1)
            .replacen("gemini_", "gemini.", 1)
            .replacen("discord_", "discord.", 1)
            .replacen("resend_", "resend.", 1)
            .replacen("worker_", "worker.", 1)
            .to_string();
        mapped.into()
    })
}
