// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord integration for the Belay moderation service.
//!
//! Covers the three Discord-facing concerns of the pipeline: Ed25519
//! verification of interaction callbacks, publishing interactive approval
//! cards through the bot REST API, and the fire-and-forget audit webhook.

pub mod audit;
pub mod interaction;
pub mod publish;
pub mod signature;

pub use audit::AuditLog;
pub use interaction::{Action, Interaction, ParseError, ephemeral, modal, parse_interaction, pong};
pub use publish::{DiscordClient, FeedbackMessage};
pub use signature::SignatureVerifier;
