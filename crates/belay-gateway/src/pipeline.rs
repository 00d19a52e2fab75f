// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound moderation pipeline.
//!
//! One pass per inbound email: admission gate, keyword classification,
//! AI draft, persistence, approval card. Stages degrade independently;
//! a failure in any of them never propagates back to the webhook caller.

use tracing::{debug, info, warn};

use belay_core::traits::kv::TTL_DECISION;
use belay_core::types::now_millis;
use belay_core::{DecisionStatus, InboundEmail, PendingDecision};
use belay_discord::audit::COLOR_YELLOW;
use belay_moderation::{GateVerdict, StatAction, classify, record_stat};

use crate::server::AppState;

/// Run one inbound email through the full pipeline.
///
/// Returns the persisted decision when the message was admitted, `None`
/// when it was dropped or rejected by the gate.
pub async fn process_inbound(state: &AppState, email: InboundEmail) -> Option<PendingDecision> {
    let kv = state.kv.as_deref();

    match state.gate.check(&email, kv).await {
        GateVerdict::ThreadReply => {
            debug!(from = %email.from, "dropping thread reply");
            return None;
        }
        GateVerdict::Rejected { reason } => {
            info!(from = %email.from, %reason, "rejected by gate");
            state
                .audit
                .spam_attempt(&email.sender_identity(), &reason)
                .await;
            return None;
        }
        GateVerdict::Admitted { suspicious } => {
            if suspicious {
                info!(from = %email.from, "suspicious content flagged");
                state
                    .audit
                    .spam_attempt(
                        &email.sender_identity(),
                        "Suspicious content patterns detected",
                    )
                    .await;
            }
            if let Some(kv) = kv {
                record_stat(kv, StatAction::Email).await;
            }

            let category = classify(&email.subject, &email.text);
            info!(id = %email.id, %category, "email admitted");

            let ai_reply = match &state.drafter {
                Some(drafter) => {
                    if let Some(kv) = kv {
                        record_stat(kv, StatAction::AiCall).await;
                    }
                    drafter.draft(&email, category).await
                }
                None => None,
            };

            let decision = PendingDecision {
                suggested_tone: category.suggested_tone(),
                category,
                ai_reply,
                status: DecisionStatus::Pending,
                is_suspicious: suspicious,
                created_at: now_millis(),
                updated_at: None,
                reviewed_by: None,
                sent_reply: None,
                email,
            };

            if let Some(kv) = kv {
                match serde_json::to_string(&decision) {
                    Ok(json) => {
                        if let Err(e) = kv.put(&decision.kv_key(), &json, Some(TTL_DECISION)).await
                        {
                            warn!(error = %e, "failed to persist decision");
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to serialize decision"),
                }
            }

            if let (Some(discord), Some(channel)) = (&state.discord, &state.channels.approval) {
                match discord.send_email_card(channel, &decision).await {
                    Ok(message_id) => {
                        debug!(%message_id, "approval card posted");
                        if let Some(kv) = kv {
                            record_stat(kv, StatAction::DiscordSend).await;
                        }
                    }
                    Err(e) => warn!(error = %e, "approval card post failed"),
                }
            }

            state
                .audit
                .log(
                    "📬 New Email Received",
                    &format!(
                        "**From:** {}\n**Subject:** {}\n**Category:** {}",
                        decision.email.from, decision.email.subject, decision.category
                    ),
                    COLOR_YELLOW,
                )
                .await;

            Some(decision)
        }
    }
}
