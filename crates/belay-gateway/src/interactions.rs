// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `/interactions` endpoint: Discord's human-approval callbacks.
//!
//! Every POST is Ed25519-verified over `timestamp + rawBody` before any
//! parsing. All action handlers are idempotent: a decision or route that
//! already left the pending state answers with an ephemeral notice and is
//! never modified again.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use belay_core::traits::kv::TTL_DECISION;
use belay_core::types::{email_key, now_millis, route_key};
use belay_core::{DecisionStatus, KvStore, PendingDecision, RouteStatus, RouteSubmission};
use belay_discord::audit::{COLOR_BLUE, COLOR_GREEN, COLOR_RED};
use belay_discord::{Action, Interaction, ephemeral, modal, parse_interaction, pong};
use belay_gemini::default_reply;

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ChallengeParams {
    #[serde(default)]
    pub challenge: Option<String>,
}

/// GET /interactions
///
/// Endpoint-verification handshake: echo the challenge back as plain text.
pub async fn get_challenge(Query(params): Query<ChallengeParams>) -> Response {
    match params.challenge {
        Some(challenge) => challenge.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// POST /interactions
pub async fn post_interaction(
    State(state): State<AppState>,
    Query(params): Query<ChallengeParams>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Some proxies replay the verification handshake as a POST.
    if headers
        .get("x-discord-request-type")
        .and_then(|v| v.to_str().ok())
        == Some("3")
        && let Some(challenge) = params.challenge
    {
        return challenge.into_response();
    }

    let signature = headers
        .get("x-signature-ed25519")
        .and_then(|v| v.to_str().ok());
    let timestamp = headers
        .get("x-signature-timestamp")
        .and_then(|v| v.to_str().ok());

    let (Some(signature), Some(timestamp), Some(verifier)) =
        (signature, timestamp, &state.verifier)
    else {
        warn!("interaction rejected: missing signature material");
        return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
    };

    if !verifier.verify(timestamp, &body, signature) {
        warn!("interaction rejected: bad signature");
        return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
    }

    let interaction = match parse_interaction(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "unparseable interaction");
            return Json(ephemeral("Error processing interaction")).into_response();
        }
    };

    match interaction {
        Interaction::Ping => Json(pong()).into_response(),
        Interaction::ButtonClick {
            action,
            id,
            user_id,
        } => dispatch_button(&state, action, &id, &user_id).await,
        Interaction::ModalSubmit { id, reply, user_id } => {
            handle_modal_submit(&state, &id, &reply, &user_id).await
        }
    }
}

async fn dispatch_button(state: &AppState, action: Action, id: &str, user_id: &str) -> Response {
    info!(?action, id, user_id, "interaction button");
    match action {
        Action::Approve | Action::Reject | Action::Edit | Action::View => {
            let Some(decision) = load_decision(state, id).await else {
                return Json(ephemeral("Email not found or expired")).into_response();
            };
            match action {
                Action::Approve => handle_approve(state, decision, user_id).await,
                Action::Reject => handle_reject(state, decision, user_id).await,
                Action::Edit => handle_edit(decision),
                Action::View => handle_view(state, decision, user_id).await,
                _ => unreachable!(),
            }
        }
        Action::ApproveRoute | Action::RejectRoute => {
            let Some(route) = load_route(state, id).await else {
                return Json(ephemeral("Route not found or expired")).into_response();
            };
            handle_route_decision(state, route, action == Action::ApproveRoute, user_id).await
        }
    }
}

async fn load_decision(state: &AppState, id: &str) -> Option<PendingDecision> {
    let kv = state.kv.as_ref()?;
    let json = kv.get(&email_key(id)).await.ok()??;
    match serde_json::from_str(&json) {
        Ok(decision) => Some(decision),
        Err(e) => {
            warn!(error = %e, id, "stored decision unreadable");
            None
        }
    }
}

async fn load_route(state: &AppState, id: &str) -> Option<RouteSubmission> {
    let kv = state.kv.as_ref()?;
    let json = kv.get(&route_key(id)).await.ok()??;
    match serde_json::from_str(&json) {
        Ok(route) => Some(route),
        Err(e) => {
            warn!(error = %e, id, "stored route unreadable");
            None
        }
    }
}

async fn persist_decision(kv: &dyn KvStore, decision: &PendingDecision) {
    match serde_json::to_string(decision) {
        Ok(json) => {
            if let Err(e) = kv.put(&decision.kv_key(), &json, Some(TTL_DECISION)).await {
                warn!(error = %e, id = %decision.email.id, "decision persist failed");
            }
        }
        Err(e) => warn!(error = %e, "decision serialization failed"),
    }
}

async fn handle_approve(
    state: &AppState,
    mut decision: PendingDecision,
    user_id: &str,
) -> Response {
    if !decision.is_pending() {
        return Json(ephemeral("Email already resolved")).into_response();
    }

    let reply = decision
        .ai_reply
        .clone()
        .unwrap_or_else(|| default_reply(&decision.email.from));

    let sent = match &state.mailer {
        Some(mailer) => mailer.send_reply(&decision.email, &reply).await.is_ok(),
        None => false,
    };

    if !sent {
        // Keep the record pending so the operator can retry or edit.
        return Json(ephemeral("❌ Failed to send email")).into_response();
    }

    let from = decision.email.from.clone();
    decision.status = DecisionStatus::Approved;
    decision.updated_at = Some(now_millis());
    decision.reviewed_by = Some(user_id.to_string());
    decision.sent_reply = Some(reply);
    if let Some(kv) = &state.kv {
        persist_decision(kv.as_ref(), &decision).await;
    }

    state
        .audit
        .log(
            "✅ Reply Sent",
            &format!("**To:** {from}\n**By:** <@{user_id}>"),
            COLOR_GREEN,
        )
        .await;

    Json(ephemeral(&format!("✅ Reply sent to {from}"))).into_response()
}

async fn handle_reject(
    state: &AppState,
    mut decision: PendingDecision,
    user_id: &str,
) -> Response {
    if !decision.is_pending() {
        return Json(ephemeral("Email already resolved")).into_response();
    }

    let from = decision.email.from.clone();
    decision.status = DecisionStatus::Rejected;
    decision.updated_at = Some(now_millis());
    decision.reviewed_by = Some(user_id.to_string());
    if let Some(kv) = &state.kv {
        persist_decision(kv.as_ref(), &decision).await;
    }

    state
        .audit
        .log(
            "❌ Email Rejected",
            &format!("**From:** {from}\n**By:** <@{user_id}>"),
            COLOR_RED,
        )
        .await;

    Json(ephemeral(&format!("❌ Email from {from} rejected"))).into_response()
}

fn handle_edit(decision: PendingDecision) -> Response {
    if !decision.is_pending() {
        return Json(ephemeral("Email already resolved")).into_response();
    }
    let prefill = decision
        .ai_reply
        .clone()
        .unwrap_or_else(|| default_reply(&decision.email.from));
    Json(modal(&decision.email.id, &prefill)).into_response()
}

async fn handle_view(state: &AppState, mut decision: PendingDecision, user_id: &str) -> Response {
    // Draft on demand so the operator always has something to review, but
    // persist it only while the record is still pending.
    if decision.ai_reply.is_none()
        && !decision.email.text.is_empty()
        && let Some(drafter) = &state.drafter
        && let Some(draft) = drafter.draft(&decision.email, decision.category).await
    {
        decision.ai_reply = Some(draft);
        if decision.is_pending()
            && let Some(kv) = &state.kv
        {
            persist_decision(kv.as_ref(), &decision).await;
        }
    }

    let email = &decision.email;
    let content = if !email.text.is_empty() {
        email.text.as_str()
    } else {
        email.html.as_deref().unwrap_or("[No email content available]")
    };
    let attachments = if email.attachments.is_empty() {
        "No attachments".to_string()
    } else {
        format!(
            "Attachments: {}",
            email
                .attachments
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    let full = format!(
        "**Full Email**\nFrom: {}\nSubject: {}\nDate: {}\n\n{}\n\n{}\n\n---\n\n**AI Suggested Reply:**\n{}",
        email.from,
        email.subject,
        email.received_at,
        content,
        attachments,
        decision.ai_reply.as_deref().unwrap_or("No AI reply available"),
    );
    let truncated: String = full.chars().take(1900).collect();

    state
        .audit
        .log(
            "📋 Full Email Viewed",
            &format!("**From:** {}\n**Viewed by:** <@{user_id}>", email.from),
            COLOR_BLUE,
        )
        .await;

    Json(ephemeral(&format!("📧 **Full Email Details**\n\n{truncated}"))).into_response()
}

async fn handle_modal_submit(
    state: &AppState,
    id: &str,
    reply: &str,
    user_id: &str,
) -> Response {
    let Some(mut decision) = load_decision(state, id).await else {
        return Json(ephemeral("Email not found or expired")).into_response();
    };
    if !decision.is_pending() {
        return Json(ephemeral("Email already resolved")).into_response();
    }

    let sent = match &state.mailer {
        Some(mailer) => mailer.send_reply(&decision.email, reply).await.is_ok(),
        None => false,
    };
    if !sent {
        return Json(ephemeral("❌ Failed to send edited email")).into_response();
    }

    let from = decision.email.from.clone();
    decision.status = DecisionStatus::Edited;
    decision.updated_at = Some(now_millis());
    decision.reviewed_by = Some(user_id.to_string());
    decision.sent_reply = Some(reply.to_string());
    if let Some(kv) = &state.kv {
        persist_decision(kv.as_ref(), &decision).await;
    }

    let excerpt: String = reply.chars().take(100).collect();
    state
        .audit
        .log(
            "✏️ Edited Reply Sent",
            &format!("**To:** {from}\n**Content:** {excerpt}..."),
            COLOR_BLUE,
        )
        .await;

    Json(ephemeral(&format!("✅ Edited reply sent to {from}"))).into_response()
}

async fn handle_route_decision(
    state: &AppState,
    mut route: RouteSubmission,
    approved: bool,
    user_id: &str,
) -> Response {
    if !route.is_pending() {
        return Json(ephemeral("Route already resolved")).into_response();
    }

    route.status = if approved {
        RouteStatus::Approved
    } else {
        RouteStatus::Rejected
    };
    route.updated_at = Some(now_millis());
    route.reviewed_by = Some(user_id.to_string());

    if let Some(kv) = &state.kv {
        match serde_json::to_string(&route) {
            Ok(json) => {
                if let Err(e) = kv.put(&route.kv_key(), &json, None).await {
                    warn!(error = %e, route = %route.id, "route persist failed");
                }
            }
            Err(e) => warn!(error = %e, "route serialization failed"),
        }
    }

    // Best-effort submitter notification.
    if !route.submitted_by_email.is_empty()
        && let Some(mailer) = &state.mailer
        && let Err(e) = mailer
            .send_route_notification(&route.submitted_by_email, &route.name, approved)
            .await
    {
        warn!(error = %e, route = %route.id, "route notification failed");
    }

    let (title, color, verb) = if approved {
        ("✅ Route Approved", COLOR_GREEN, "Approved")
    } else {
        ("❌ Route Rejected", COLOR_RED, "Rejected")
    };
    state
        .audit
        .log(
            title,
            &format!(
                "**Route:** {}\n**Grade:** {}\n**{verb} by:** <@{user_id}>",
                route.name, route.grade
            ),
            color,
        )
        .await;

    let ack = if approved {
        format!("✅ Route \"{}\" approved!", route.name)
    } else {
        format!("❌ Route \"{}\" rejected", route.name)
    };
    Json(ephemeral(&ack)).into_response()
}
