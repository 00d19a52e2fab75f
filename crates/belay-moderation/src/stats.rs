// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort daily usage counters.
//!
//! The read-merge-write here is intentionally non-atomic: concurrent
//! increments may lose an update. Counters feed an observability endpoint
//! and a naive cost estimate, nothing load-bearing, and they must never
//! block or fail the primary pipeline.

use tracing::warn;

use belay_core::traits::kv::TTL_STATS;
use belay_core::types::{stats_key, today_utc};
use belay_core::{KvStore, UsageStats};

/// Which counter an event advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatAction {
    /// An email passed admission control.
    Email,
    /// A Gemini draft call was made.
    AiCall,
    /// A Discord message was published.
    DiscordSend,
}

/// Increment today's counter for `action`. Swallows every error after
/// logging -- callers never observe a failure.
pub async fn record_stat(kv: &dyn KvStore, action: StatAction) {
    let key = stats_key(&today_utc());
    let mut stats = match load_day(kv, &key).await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(error = %e, "stats read failed, skipping update");
            return;
        }
    };

    match action {
        StatAction::Email => stats.emails += 1,
        StatAction::AiCall => stats.ai_calls += 1,
        StatAction::DiscordSend => stats.discord_sends += 1,
    }

    let json = match serde_json::to_string(&stats) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "stats serialization failed");
            return;
        }
    };
    if let Err(e) = kv.put(&key, &json, Some(TTL_STATS)).await {
        warn!(error = %e, "stats write failed");
    }
}

/// Read the stats blob for a `stats:{date}` key, defaulting to zeros.
pub async fn load_day(
    kv: &dyn KvStore,
    key: &str,
) -> Result<UsageStats, belay_core::BelayError> {
    let stats = match kv.get(key).await? {
        Some(json) => serde_json::from_str(&json).unwrap_or_default(),
        None => UsageStats::default(),
    };
    Ok(stats)
}
