// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Belay workspace.
//!
//! Persisted records serialize with camelCase field names -- this is the wire
//! layout in the KV store and must not drift between releases.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Current unix time in milliseconds, the `createdAt`/`updatedAt` clock.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Today's UTC calendar date as `YYYY-MM-DD`, the rate/stats key component.
pub fn today_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// An email attachment descriptor. Only metadata is kept; bodies are never
/// persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
}

/// A transient inbound email, created once per webhook invocation.
///
/// Never mutated; folded into a [`PendingDecision`] and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEmail {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Header names are lower-cased at the boundary.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// RFC 3339 receive timestamp.
    pub received_at: String,
}

impl InboundEmail {
    /// Sender identity for rate limiting: the address inside angle brackets
    /// if present, else the raw `From` value, lower-cased.
    pub fn sender_identity(&self) -> String {
        extract_sender(&self.from)
    }
}

/// Extract the bare address from a `From` header value.
pub fn extract_sender(from: &str) -> String {
    if let (Some(start), Some(end)) = (from.find('<'), from.rfind('>'))
        && start < end
    {
        return from[start + 1..end].to_lowercase();
    }
    from.to_lowercase()
}

/// Message category assigned by the keyword classifier.
///
/// Ordering of variants mirrors classification priority; see
/// `belay_moderation::classify`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmailCategory {
    Urgent,
    BugReport,
    Partnership,
    FeatureRequest,
    Feedback,
    Question,
    GeneralInquiry,
}

/// Suggested reply tone, derived from the category via a fixed table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReplyTone {
    UrgentCaring,
    ApologeticProfessional,
    ProfessionalBusiness,
    AppreciativeEnthusiastic,
    GratefulResponsive,
    HelpfulClear,
    FriendlyProfessional,
}

impl EmailCategory {
    /// Fixed category-to-tone lookup.
    pub fn suggested_tone(self) -> ReplyTone {
        match self {
            EmailCategory::Urgent => ReplyTone::UrgentCaring,
            EmailCategory::BugReport => ReplyTone::ApologeticProfessional,
            EmailCategory::Partnership => ReplyTone::ProfessionalBusiness,
            EmailCategory::FeatureRequest => ReplyTone::AppreciativeEnthusiastic,
            EmailCategory::Feedback => ReplyTone::GratefulResponsive,
            EmailCategory::Question => ReplyTone::HelpfulClear,
            EmailCategory::GeneralInquiry => ReplyTone::FriendlyProfessional,
        }
    }
}

/// Life-cycle state of a pending decision.
///
/// Transitions only `Pending -> {Approved, Rejected, Edited}`, exactly once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    Approved,
    Rejected,
    Edited,
}

/// A persisted, single-transition approval record for one inbound email.
///
/// Stored under `email:{id}` with a 7-day TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDecision {
    #[serde(flatten)]
    pub email: InboundEmail,
    pub category: EmailCategory,
    pub suggested_tone: ReplyTone,
    pub ai_reply: Option<String>,
    pub status: DecisionStatus,
    pub is_suspicious: bool,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_reply: Option<String>,
}

impl PendingDecision {
    /// KV key for this decision.
    pub fn kv_key(&self) -> String {
        email_key(&self.email.id)
    }

    /// Whether a terminal transition is still allowed.
    pub fn is_pending(&self) -> bool {
        self.status == DecisionStatus::Pending
    }
}

/// Life-cycle state of a route submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    DiscordPending,
    Approved,
    Rejected,
}

/// A persisted, single-transition approval record for one user-submitted
/// climbing route. Stored under `route:{id}` without an explicit TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSubmission {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    pub submitted_by: String,
    pub submitted_by_email: String,
    pub status: RouteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_message_id: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

impl RouteSubmission {
    /// KV key for this submission.
    pub fn kv_key(&self) -> String {
        route_key(&self.id)
    }

    /// Whether a terminal transition is still allowed.
    pub fn is_pending(&self) -> bool {
        self.status == RouteStatus::DiscordPending
    }
}

/// Daily usage counters, stored under `stats:{YYYY-MM-DD}` with a 7-day TTL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    #[serde(default)]
    pub emails: u64,
    #[serde(default)]
    pub ai_calls: u64,
    #[serde(default)]
    pub discord_sends: u64,
}

// --- KV key layout ---

/// Key for a pending email decision.
pub fn email_key(id: &str) -> String {
    format!("email:{id}")
}

/// Key for a route submission.
pub fn route_key(id: &str) -> String {
    format!("route:{id}")
}

/// Key for a per-sender daily rate counter.
pub fn rate_key(sender: &str, iso_date: &str) -> String {
    format!("rate:{sender}:{iso_date}")
}

/// Key for a daily usage stats blob.
pub fn stats_key(iso_date: &str) -> String {
    format!("stats:{iso_date}")
}
