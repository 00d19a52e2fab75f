// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Belay moderation service.

use thiserror::Error;

/// The primary error type used across Belay adapters and the pipeline.
///
/// Degraded-feature failures (a missing API key, a refused Discord publish,
/// a failed draft) are deliberately NOT represented here -- those paths log
/// and continue. Only conditions the caller must act on become errors.
#[derive(Debug, Error)]
pub enum BelayError {
    /// Configuration errors (invalid TOML, bad values, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Key-value store errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound HTTP errors (Gemini, Discord REST, Resend).
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Interaction callback signature could not be verified.
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
