// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the public REST surface.
//!
//! Handles health, the inbound webhook, route and feedback submission,
//! and the stats endpoint. Discord interaction callbacks live in
//! [`crate::interactions`].

use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use belay_core::types::{now_millis, stats_key, today_utc};
use belay_core::{Attachment, InboundEmail, RouteStatus, RouteSubmission};
use belay_discord::FeedbackMessage;
use belay_moderation::stats::load_day;

use crate::pipeline;
use crate::server::AppState;

/// Inbound email payload delivered by the Resend webhook.
///
/// Every field is optional on the wire; absent values get the same
/// placeholders the sender-facing pipeline expects.
#[derive(Debug, Deserialize)]
pub struct WebhookEmail {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<WebhookAttachment>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookAttachment {
    #[serde(default, alias = "filename")]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, alias = "content_type")]
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
}

impl WebhookEmail {
    /// Normalize into the pipeline's inbound type with a fresh id.
    fn into_inbound(self) -> InboundEmail {
        let id = format!("email_{}_{}", now_millis(), &uuid::Uuid::new_v4().simple().to_string()[..9]);
        InboundEmail {
            id,
            from: self.from.unwrap_or_else(|| "unknown".to_string()),
            to: self.to.unwrap_or_else(|| "unknown".to_string()),
            subject: self.subject.unwrap_or_else(|| "(No subject)".to_string()),
            text: self.text.unwrap_or_default(),
            html: self.html,
            headers: self
                .headers
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            attachments: self
                .attachments
                .into_iter()
                .enumerate()
                .map(|(i, a)| Attachment {
                    name: a.name.unwrap_or_else(|| format!("attachment_{i}")),
                    size: a.size.unwrap_or(0),
                    mime_type: a
                        .mime_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                })
                .collect(),
            received_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Route submission payload from the website backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSubmitRequest {
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub submitted_by_email: Option<String>,
}

/// Feedback payload from the website.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Bearer check against the configured worker API key.
///
/// An unset key disables the check entirely.
fn check_bearer(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(expected) = &state.worker_api_key else {
        return true;
    };
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {expected}"))
}

/// GET / and GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.service_name,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// POST /resend-webhook
///
/// Runs the full pipeline inline but always acknowledges with
/// `{success:true}`; delivery problems are the pipeline's concern, not
/// the webhook caller's.
pub async fn post_resend_webhook(
    State(state): State<AppState>,
    Json(body): Json<WebhookEmail>,
) -> Response {
    let email = body.into_inbound();
    info!(id = %email.id, from = %email.from, "webhook email received");

    pipeline::process_inbound(&state, email).await;

    Json(serde_json::json!({ "success": true })).into_response()
}

/// POST /routes/discord-submit
pub async fn post_route_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RouteSubmitRequest>,
) -> Response {
    if !check_bearer(&state, &headers) {
        return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let (Some(id), Some(name), Some(grade), Some(image_url), Some(latitude), Some(longitude)) = (
        body.route_id,
        body.name,
        body.grade,
        body.image_url,
        body.latitude,
        body.longitude,
    ) else {
        return json_error(StatusCode::BAD_REQUEST, "Missing required fields");
    };

    let mut route = RouteSubmission {
        id,
        name,
        grade,
        image_url,
        latitude,
        longitude,
        country: body.country,
        region: body.region,
        town: body.town,
        submitted_by: body.submitted_by.unwrap_or_else(|| "Anonymous".to_string()),
        submitted_by_email: body.submitted_by_email.unwrap_or_default(),
        status: RouteStatus::DiscordPending,
        discord_message_id: None,
        created_at: now_millis(),
        updated_at: None,
        reviewed_by: None,
    };

    persist_route(&state, &route).await;

    let (Some(discord), Some(channel)) = (&state.discord, &state.channels.routes) else {
        warn!(route = %route.id, "route card not posted: discord not configured");
        return Json(serde_json::json!({
            "success": true,
            "warning": "Discord notification not sent"
        }))
        .into_response();
    };

    match discord.send_route_card(channel, &route).await {
        Ok(message_id) => {
            route.discord_message_id = Some(message_id.clone());
            persist_route(&state, &route).await;
            Json(serde_json::json!({ "success": true, "messageId": message_id })).into_response()
        }
        Err(e) => {
            warn!(error = %e, route = %route.id, "route card post failed");
            Json(serde_json::json!({
                "success": true,
                "warning": "Discord notification not sent"
            }))
            .into_response()
        }
    }
}

async fn persist_route(state: &AppState, route: &RouteSubmission) {
    let Some(kv) = &state.kv else { return };
    match serde_json::to_string(route) {
        Ok(json) => {
            if let Err(e) = kv.put(&route.kv_key(), &json, None).await {
                warn!(error = %e, route = %route.id, "route persist failed");
            }
        }
        Err(e) => warn!(error = %e, "route serialization failed"),
    }
}

/// POST /feedback
pub async fn post_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<FeedbackRequest>,
) -> Response {
    if !check_bearer(&state, &headers) {
        return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let message = body.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Message is required");
    }
    if message.chars().count() > 2000 {
        return json_error(
            StatusCode::BAD_REQUEST,
            "Message too long (max 2000 characters)",
        );
    }

    let feedback = FeedbackMessage {
        message: message.to_string(),
        submitted_by: if body.is_anonymous {
            None
        } else {
            body.submitted_by
        },
        is_anonymous: body.is_anonymous,
        timestamp: now_millis(),
    };

    let (Some(discord), Some(channel)) = (&state.discord, &state.channels.feedback) else {
        warn!("feedback not forwarded: discord not configured");
        return Json(serde_json::json!({
            "success": true,
            "warning": "Feedback saved but Discord notification not sent"
        }))
        .into_response();
    };

    match discord.send_feedback_embed(channel, &feedback).await {
        Ok(()) => Json(serde_json::json!({ "success": true, "message": "Feedback sent!" }))
            .into_response(),
        Err(e) => {
            warn!(error = %e, "feedback embed post failed");
            Json(serde_json::json!({ "success": true, "message": "Feedback saved" }))
                .into_response()
        }
    }
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> Response {
    let Some(kv) = &state.kv else {
        return json_error(StatusCode::SERVICE_UNAVAILABLE, "KV not available");
    };

    let today = today_utc();
    let yesterday = (chrono::Utc::now() - chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();

    let today_stats = match load_day(kv.as_ref(), &stats_key(&today)).await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(error = %e, "stats read failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch stats");
        }
    };
    let yesterday_stats = load_day(kv.as_ref(), &stats_key(&yesterday))
        .await
        .unwrap_or_default();

    // Naive per-email cost estimate; good enough for a glance.
    let cost_today = today_stats.emails as f64 * 0.00002;
    let cost_month = cost_today * 30.0;

    Json(serde_json::json!({
        "date": today,
        "stats": today_stats,
        "yesterday": yesterday_stats,
        "estimatedCostUSD": {
            "today": format!("{cost_today:.4}"),
            "month": format!("{cost_month:.2}"),
        },
        "limits": {
            "maxEmailsPerDay": state.limits.max_emails_per_day,
            "maxEmailSizeKB": state.limits.max_email_size_kb,
        },
    }))
    .into_response()
}
