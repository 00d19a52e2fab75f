// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store trait for durable TTL'd state.
//!
//! Every persisted entity (pending decisions, rate counters, stats blobs) is
//! owned by exactly one key, and only the handler resolving that entity
//! writes to its key. The runtime is stateless per invocation -- there is no
//! in-process caching across requests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BelayError;

/// TTL for `email:{id}` pending decisions: 7 days.
pub const TTL_DECISION: Duration = Duration::from_secs(604_800);

/// TTL for `rate:{sender}:{date}` counters: 24 hours.
pub const TTL_RATE_COUNTER: Duration = Duration::from_secs(86_400);

/// TTL for `stats:{date}` blobs: 7 days.
pub const TTL_STATS: Duration = Duration::from_secs(604_800);

/// Durable, eventually-consistent key-value storage with per-key TTL.
///
/// Backed by SQLite in production (`belay-kv::SqliteKv`) and an in-memory
/// map in tests (`belay-kv::MemoryKv`).
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value. Expired keys read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, BelayError>;

    /// Write a value, replacing any existing one. `ttl = None` keeps the key
    /// until overwritten or deleted.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), BelayError>;

    /// Atomically increment an integer counter and return the new value.
    ///
    /// The counter starts at 0 when the key is absent or expired. The TTL
    /// applies from the first increment of a fresh counter.
    async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, BelayError>;
}
