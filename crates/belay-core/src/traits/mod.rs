// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by backend crates.

pub mod kv;

pub use kv::KvStore;
