// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission control for inbound messages.
//!
//! The gate runs sequential checks and short-circuits on the first failure;
//! rejected messages never create a pending decision. The classifier is a
//! pure first-match keyword function, and the stats recorder is a
//! best-effort counter that never fails the primary pipeline.

pub mod classify;
pub mod gate;
pub mod stats;

pub use classify::classify;
pub use gate::{GateVerdict, SpamGate};
pub use stats::{StatAction, record_stat};
