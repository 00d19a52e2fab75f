// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Belay moderation service.
//!
//! This crate provides the foundational error type, domain types, and the
//! key-value store trait used throughout the Belay workspace. The store is
//! modeled as an injected client interface so handlers stay stateless and
//! tests can swap in an in-memory backend.

pub mod error;
pub mod traits;
pub mod types;

pub use error::BelayError;
pub use traits::kv::KvStore;
pub use types::{
    Attachment, DecisionStatus, EmailCategory, InboundEmail, PendingDecision, ReplyTone,
    RouteStatus, RouteSubmission, UsageStats,
};
