// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Belay moderation service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Every external credential is `Option` -- absence
//! degrades the matching feature instead of failing service start.

use serde::{Deserialize, Serialize};

/// Top-level Belay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with `BELAY_*`
/// environment variable overrides. All sections default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BelayConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Key-value store settings.
    #[serde(default)]
    pub kv: KvConfig,

    /// Admission-control thresholds.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Gemini text-generation API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Discord bot and interaction settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Resend transactional email settings.
    #[serde(default)]
    pub resend: ResendConfig,

    /// Shared secret for trusted server-to-server callers.
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name reported by the health endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "belay-moderation".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

/// Key-value store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KvConfig {
    /// Enable durable storage. When false, the service runs without a KV
    /// store: decisions are not persisted and `/stats` answers 503.
    #[serde(default = "default_kv_enabled")]
    pub enabled: bool,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            enabled: default_kv_enabled(),
            database_path: default_database_path(),
        }
    }
}

fn default_kv_enabled() -> bool {
    true
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("belay").join("belay.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("belay.db"))
        .to_string_lossy()
        .into_owned()
}

/// Admission-control thresholds for the spam gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// Maximum accepted messages per sender per UTC day.
    #[serde(default = "default_max_emails_per_day")]
    pub max_emails_per_day: u32,

    /// Maximum combined text+html size in KiB.
    #[serde(default = "default_max_email_size_kb")]
    pub max_email_size_kb: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            max_emails_per_day: default_max_emails_per_day(),
            max_email_size_kb: default_max_email_size_kb(),
        }
    }
}

fn default_max_emails_per_day() -> u32 {
    10
}

fn default_max_email_size_kb() -> usize {
    100
}

/// Gemini text-generation API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` disables reply drafting entirely.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for reply drafts.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridden in tests).
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

/// Discord bot and interaction configuration.
///
/// Each field is independently optional; a missing value disables exactly
/// the feature that needs it (approval cards, route cards, signature
/// verification, audit log).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token for the message REST API.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Hex-encoded Ed25519 public key for interaction callbacks.
    #[serde(default)]
    pub public_key: Option<String>,

    /// Channel receiving email approval cards.
    #[serde(default)]
    pub approval_channel_id: Option<String>,

    /// Channel receiving route approval cards.
    #[serde(default)]
    pub route_channel_id: Option<String>,

    /// Channel receiving forwarded user feedback.
    #[serde(default)]
    pub feedback_channel_id: Option<String>,

    /// Webhook URL for the fire-and-forget audit log.
    #[serde(default)]
    pub log_webhook_url: Option<String>,

    /// REST API base URL (overridden in tests).
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            public_key: None,
            approval_channel_id: None,
            route_channel_id: None,
            feedback_channel_id: None,
            log_webhook_url: None,
            api_base: default_discord_api_base(),
        }
    }
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

/// Resend transactional email configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResendConfig {
    /// API key. `None` disables outbound email.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address for outbound replies.
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// API base URL (overridden in tests).
    #[serde(default = "default_resend_api_base")]
    pub api_base: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_address: default_from_address(),
            api_base: default_resend_api_base(),
        }
    }
}

fn default_from_address() -> String {
    "gsyrocks.com <hello@gsyrocks.com>".to_string()
}

fn default_resend_api_base() -> String {
    "https://api.resend.com".to_string()
}

/// Shared secret required from trusted server-to-server callers
/// (`/routes/discord-submit`, `/feedback`). `None` disables the check.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Bearer token value.
    #[serde(default)]
    pub api_key: Option<String>,
}
