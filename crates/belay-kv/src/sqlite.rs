// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`KvStore`] trait.
//!
//! Keys live in a single `kv` table with an optional unix-millisecond
//! expiry. Expired rows read as absent; they are reaped lazily on access
//! rather than by a background task (the runtime has no scheduler).

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use belay_core::{BelayError, KvStore};

/// Map a tokio-rusqlite error into the workspace error type.
fn map_kv_err(e: tokio_rusqlite::Error) -> BelayError {
    BelayError::Storage {
        source: Box::new(e),
    }
}

fn now_millis() -> i64 {
    belay_core::types::now_millis()
}

fn expiry_millis(ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|t| now_millis() + t.as_millis() as i64)
}

/// SQLite-backed TTL key-value store.
pub struct SqliteKv {
    conn: tokio_rusqlite::Connection,
}

impl SqliteKv {
    /// Open (or create) the database at `path` and ensure the schema.
    pub async fn open(path: &str) -> Result<Self, BelayError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_kv_err(e.into()))?;
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 CREATE TABLE IF NOT EXISTS kv (
                     key        TEXT PRIMARY KEY,
                     value      TEXT NOT NULL,
                     expires_at INTEGER
                 );",
            )?;
            Ok(())
        })
        .await
        .map_err(map_kv_err)?;
        debug!(path, "sqlite kv store opened");
        Ok(Self { conn })
    }

    /// Open an in-process database (used by unit tests).
    pub async fn open_in_memory() -> Result<Self, BelayError> {
        Self::open(":memory:").await
    }
}

#[async_trait]
impl KvStore for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<String>, BelayError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let now = now_millis();
                let row: Option<(String, Option<i64>)> = match conn.query_row(
                    "SELECT value, expires_at FROM kv WHERE key = ?1",
                    rusqlite::params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                ) {
                    Ok(row) => Some(row),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };
                match row {
                    Some((_, Some(expires))) if expires <= now => {
                        conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
                        Ok(None)
                    }
                    Some((value, _)) => Ok(Some(value)),
                    None => Ok(None),
                }
            })
            .await
            .map_err(map_kv_err)
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), BelayError> {
        let key = key.to_string();
        let value = value.to_string();
        let expires = expiry_millis(ttl);
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = ?2, expires_at = ?3",
                    rusqlite::params![key, value, expires],
                )?;
                Ok(())
            })
            .await
            .map_err(map_kv_err)
    }

    async fn incr(&self, key: &str, ttl: Option<Duration>) -> Result<i64, BelayError> {
        let key = key.to_string();
        let expires = expiry_millis(ttl);
        self.conn
            .call(move |conn| {
                let now = now_millis();
                // Single upsert so concurrent increments cannot read the same
                // starting count. An expired counter restarts at 1 with a
                // fresh expiry.
                let value: i64 = conn.query_row(
                    "INSERT INTO kv (key, value, expires_at) VALUES (?1, '1', ?2)
                     ON CONFLICT(key) DO UPDATE SET
                         value = CASE
                             WHEN kv.expires_at IS NOT NULL AND kv.expires_at <= ?3 THEN '1'
                             ELSE CAST(CAST(kv.value AS INTEGER) + 1 AS TEXT)
                         END,
                         expires_at = CASE
                             WHEN kv.expires_at IS NOT NULL AND kv.expires_at <= ?3 THEN ?2
                             ELSE kv.expires_at
                         END
                     RETURNING CAST(value AS INTEGER)",
                    rusqlite::params![key, expires, now],
                    |row| row.get(0),
                )?;
                Ok(value)
            })
            .await
            .map_err(map_kv_err)
    }
}
