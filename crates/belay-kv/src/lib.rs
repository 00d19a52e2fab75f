// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value persistence for the Belay moderation service.
//!
//! Provides a WAL-mode SQLite backend with per-key TTL and an atomic
//! counter increment, plus an in-memory backend for tests and dev runs.
//! All writes are serialized through tokio-rusqlite's single background
//! thread; do not open additional connections for writes.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;
