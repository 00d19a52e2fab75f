// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Belay moderation service.
//!
//! Hosts the inbound webhook, the Discord interaction callback endpoint,
//! route and feedback submission, and the stats endpoint, and drives the
//! moderation pipeline that connects them.

pub mod handlers;
pub mod interactions;
pub mod pipeline;
pub mod server;

pub use server::{AppState, build_router, start_server};
