// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the moderation service.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use belay_config::BelayConfig;
use belay_core::{BelayError, KvStore};
use belay_discord::{AuditLog, DiscordClient, SignatureVerifier};
use belay_email::ResendMailer;
use belay_gemini::ReplyDrafter;
use belay_moderation::SpamGate;

use crate::handlers;
use crate::interactions;

/// Discord channel ids for the three card destinations.
#[derive(Debug, Clone, Default)]
pub struct Channels {
    /// Email approval cards.
    pub approval: Option<String>,
    /// Route approval cards.
    pub routes: Option<String>,
    /// Forwarded user feedback.
    pub feedback: Option<String>,
}

/// Admission thresholds echoed by the stats endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_emails_per_day: u32,
    pub max_email_size_kb: usize,
}

/// Shared state for axum request handlers.
///
/// Every external adapter is optional; a missing credential disables the
/// matching feature rather than the whole service.
#[derive(Clone)]
pub struct AppState {
    /// Durable store for decisions, routes, counters, and stats.
    pub kv: Option<Arc<dyn KvStore>>,
    /// Admission-control gate for inbound email.
    pub gate: Arc<SpamGate>,
    /// AI reply drafter.
    pub drafter: Option<Arc<ReplyDrafter>>,
    /// Bot client for posting cards.
    pub discord: Option<Arc<DiscordClient>>,
    /// Outbound transactional mailer.
    pub mailer: Option<Arc<ResendMailer>>,
    /// Ed25519 verifier for interaction callbacks.
    pub verifier: Option<Arc<SignatureVerifier>>,
    /// Fire-and-forget audit trail.
    pub audit: AuditLog,
    /// Card destination channels.
    pub channels: Channels,
    /// Shared secret for server-to-server submission endpoints.
    pub worker_api_key: Option<String>,
    /// Service name reported by the health endpoint.
    pub service_name: String,
    /// Thresholds echoed by the stats endpoint.
    pub limits: Limits,
}

impl AppState {
    /// Wire up all adapters from config.
    ///
    /// Fails only on an unusable Discord public key; every other missing
    /// credential degrades its feature.
    pub fn from_config(
        config: &BelayConfig,
        kv: Option<Arc<dyn KvStore>>,
    ) -> Result<Self, BelayError> {
        let verifier = match &config.discord.public_key {
            Some(hex_key) => Some(Arc::new(SignatureVerifier::from_hex(hex_key)?)),
            None => None,
        };

        Ok(Self {
            kv,
            gate: Arc::new(SpamGate::new(&config.moderation)),
            drafter: ReplyDrafter::from_config(&config.gemini).map(Arc::new),
            discord: DiscordClient::from_config(&config.discord).map(Arc::new),
            mailer: ResendMailer::from_config(&config.resend).map(Arc::new),
            verifier,
            audit: AuditLog::new(config.discord.log_webhook_url.clone()),
            channels: Channels {
                approval: config.discord.approval_channel_id.clone(),
                routes: config.discord.route_channel_id.clone(),
                feedback: config.discord.feedback_channel_id.clone(),
            },
            worker_api_key: config.worker.api_key.clone(),
            service_name: config.service.name.clone(),
            limits: Limits {
                max_emails_per_day: config.moderation.max_emails_per_day,
                max_email_size_kb: config.moderation.max_email_size_kb,
            },
        })
    }
}

/// Build the full gateway router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::get_health))
        .route("/health", get(handlers::get_health))
        .route("/resend-webhook", post(handlers::post_resend_webhook))
        .route("/routes/discord-submit", post(handlers::post_route_submit))
        .route("/feedback", post(handlers::post_feedback))
        .route("/stats", get(handlers::get_stats))
        .route(
            "/interactions",
            get(interactions::get_challenge).post(interactions::post_interaction),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the gateway until the process is stopped.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), BelayError> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BelayError::Http {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| BelayError::Http {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
