// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `belay serve` command implementation.
//!
//! Opens the SQLite KV store when enabled, wires the external adapters
//! from config, and runs the gateway HTTP server until the process is
//! stopped.

use std::sync::Arc;

use belay_config::BelayConfig;
use belay_core::{BelayError, KvStore};
use belay_gateway::{AppState, start_server};
use belay_kv::SqliteKv;
use tracing::{info, warn};

/// Runs the `belay serve` command.
pub async fn run_serve(config: BelayConfig) -> Result<(), BelayError> {
    init_tracing(&config.service.log_level);

    info!("starting belay serve");

    let kv: Option<Arc<dyn KvStore>> = if config.kv.enabled {
        if let Some(parent) = std::path::Path::new(&config.kv.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| BelayError::Storage {
                source: Box::new(e),
            })?;
        }
        let store = SqliteKv::open(&config.kv.database_path).await?;
        info!(path = %config.kv.database_path, "kv store opened");
        Some(Arc::new(store))
    } else {
        warn!("kv store disabled: decisions will not be persisted and /stats is unavailable");
        None
    };

    let state = AppState::from_config(&config, kv)?;

    if state.drafter.is_none() {
        warn!("gemini api key not set: AI reply drafting disabled");
    }
    if state.discord.is_none() {
        warn!("discord bot token not set: approval cards disabled");
    }
    if state.verifier.is_none() {
        warn!("discord public key not set: interaction callbacks will be rejected");
    }
    if state.mailer.is_none() {
        warn!("resend api key not set: outbound email disabled");
    }

    start_server(&config.server.host, config.server.port, state).await
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("belay={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
