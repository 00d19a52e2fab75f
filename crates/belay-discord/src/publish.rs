// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound bot messages: approval cards and embeds.
//!
//! All posts go through the channel messages REST endpoint authenticated
//! with the bot token. Card layouts are stable wire shapes; the interaction
//! router depends on the `custom_id` values emitted here.

use belay_config::DiscordConfig;
use belay_core::{BelayError, EmailCategory, PendingDecision, RouteSubmission};
use serde::Deserialize;
use tracing::warn;

const COLOR_RED: u32 = 0xe74c3c;
const COLOR_YELLOW: u32 = 0xf1c40f;
const COLOR_ORANGE: u32 = 0xe67e22;
const COLOR_BLURPLE: u32 = 0x5865f2;

/// Emoji and human label shown on an approval card for each category.
fn category_badge(category: EmailCategory) -> (&'static str, &'static str) {
    match category {
        EmailCategory::BugReport => ("🐛", "Bug Report"),
        EmailCategory::FeatureRequest => ("✨", "Feature Request"),
        EmailCategory::Question => ("❓", "Question"),
        EmailCategory::GeneralInquiry => ("💬", "General Inquiry"),
        EmailCategory::Partnership => ("🤝", "Partnership"),
        EmailCategory::Feedback => ("📝", "Feedback"),
        EmailCategory::Urgent => ("🚨", "Urgent"),
    }
}

/// A feedback message forwarded from the website.
#[derive(Debug, Clone)]
pub struct FeedbackMessage {
    pub message: String,
    pub submitted_by: Option<String>,
    pub is_anonymous: bool,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Bot REST client for posting cards into moderation channels.
pub struct DiscordClient {
    client: reqwest::Client,
    bot_token: String,
    api_base: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    id: String,
}

impl DiscordClient {
    /// Build from config; `None` when no bot token is configured.
    pub fn from_config(config: &DiscordConfig) -> Option<Self> {
        let bot_token = config.bot_token.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            bot_token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn post_message(
        &self,
        channel_id: &str,
        body: &serde_json::Value,
    ) -> Result<String, BelayError> {
        let url = format!("{}/channels/{channel_id}/messages", self.api_base);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(body)
            .send()
            .await
            .map_err(|e| BelayError::Http {
                message: "discord message post failed".to_string(),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, %detail, "discord rejected message post");
            return Err(BelayError::Http {
                message: format!("discord returned {status}"),
                source: None,
            });
        }

        let message: MessageResponse =
            response.json().await.map_err(|e| BelayError::Http {
                message: "discord message response unreadable".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(message.id)
    }

    /// Post an email approval card with approve/reject/edit/view buttons.
    ///
    /// Returns the posted message id.
    pub async fn send_email_card(
        &self,
        channel_id: &str,
        decision: &PendingDecision,
    ) -> Result<String, BelayError> {
        let (emoji, label) = category_badge(decision.category);
        let email = &decision.email;

        let excerpt: String = email.text.chars().take(500).collect();
        let content_field = if email.text.chars().count() > 500 {
            format!("{excerpt}...")
        } else {
            excerpt
        };

        let color = if decision.is_suspicious {
            COLOR_RED
        } else if decision.category == EmailCategory::Urgent {
            COLOR_ORANGE
        } else {
            COLOR_YELLOW
        };

        let title = if decision.is_suspicious {
            format!("⚠️ {emoji} New Email - {label}")
        } else {
            format!("{emoji} New Email - {label}")
        };

        let mut fields = Vec::new();
        if decision.is_suspicious {
            fields.push(serde_json::json!({
                "name": "⚠️ Warning",
                "value": "This email has suspicious characteristics. Review carefully before responding.",
                "inline": false
            }));
        }
        fields.push(serde_json::json!({ "name": "📧 From", "value": email.from, "inline": true }));
        fields.push(serde_json::json!({
            "name": "📅 Received",
            "value": email.received_at,
            "inline": true
        }));
        fields.push(serde_json::json!({ "name": "💬 Content", "value": content_field }));

        if let Some(reply) = &decision.ai_reply {
            let head: String = reply.chars().take(400).collect();
            let tail = if reply.chars().count() > 400 { "\n*...*" } else { "" };
            fields.push(serde_json::json!({
                "name": "🤖 AI Suggested Reply",
                "value": format!("```{head}```{tail}")
            }));
        }

        let id = &email.id;
        let body = serde_json::json!({
            "content": "📬 **New email received!** A team member needs to review and respond.",
            "embeds": [{
                "title": title,
                "description": format!("**Subject:** {}", email.subject),
                "color": color,
                "fields": fields,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "footer": { "text": format!("ID: {id}") }
            }],
            "components": [
                {
                    "type": 1,
                    "components": [
                        { "type": 2, "style": 3, "label": "✅ Approve & Send", "custom_id": format!("approve_{id}") },
                        { "type": 2, "style": 4, "label": "❌ Reject", "custom_id": format!("reject_{id}") }
                    ]
                },
                {
                    "type": 1,
                    "components": [
                        { "type": 2, "style": 1, "label": "✏️ Edit & Send", "custom_id": format!("edit_{id}") },
                        { "type": 2, "style": 2, "label": "📋 View Full", "custom_id": format!("view_{id}") }
                    ]
                }
            ]
        });

        self.post_message(channel_id, &body).await
    }

    /// Post a route approval card with an embedded static map.
    ///
    /// Returns the posted message id so the caller can store it on the
    /// submission record.
    pub async fn send_route_card(
        &self,
        channel_id: &str,
        route: &RouteSubmission,
    ) -> Result<String, BelayError> {
        let lat = route.latitude;
        let lon = route.longitude;
        let map_url = format!(
            "https://staticmap.openstreetmap.de/staticmap.php?center={lat},{lon}&zoom=17&size=600x400&markers={lat},{lon},red-pushpin"
        );

        let location = if route.town.is_some() || route.region.is_some() {
            let mut text = String::new();
            if let Some(town) = &route.town {
                text.push_str(town);
            }
            if route.town.is_some() && route.region.is_some() {
                text.push_str(", ");
            }
            if let Some(region) = &route.region {
                text.push_str(region);
            }
            if let Some(country) = &route.country {
                text.push_str(&format!(" ({country})"));
            }
            text
        } else {
            format!("{lat:.5}, {lon:.5}")
        };

        let id = &route.id;
        let body = serde_json::json!({
            "content": "🧗 **New route submitted for approval!**",
            "embeds": [{
                "title": format!("🧗 {}", route.name),
                "color": COLOR_YELLOW,
                "fields": [
                    { "name": "📊 Grade", "value": route.grade, "inline": true },
                    { "name": "👤 Submitted by", "value": route.submitted_by, "inline": true },
                    { "name": "🌍 Location", "value": location, "inline": false },
                    { "name": "🗺️ Coordinates", "value": format!("{lat:.5}, {lon:.5}"), "inline": false },
                    { "name": "🔗 Map", "value": format!("[Google Maps](https://www.google.com/maps?q={lat},{lon})"), "inline": false },
                    { "name": "🔗 Route", "value": format!("[gsyrocks.com/climb/{id}](https://gsyrocks.com/climb/{id})"), "inline": false }
                ],
                "thumbnail": { "url": route.image_url },
                "image": { "url": map_url },
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "footer": { "text": format!("Route ID: {id}") }
            }],
            "components": [{
                "type": 1,
                "components": [
                    { "type": 2, "style": 3, "label": "✅ Approve", "custom_id": format!("approve_route_{id}") },
                    { "type": 2, "style": 4, "label": "❌ Reject", "custom_id": format!("reject_route_{id}") }
                ]
            }]
        });

        self.post_message(channel_id, &body).await
    }

    /// Forward a website feedback message as a plain embed.
    pub async fn send_feedback_embed(
        &self,
        channel_id: &str,
        feedback: &FeedbackMessage,
    ) -> Result<(), BelayError> {
        let display_name = if feedback.is_anonymous {
            "Anonymous".to_string()
        } else {
            feedback
                .submitted_by
                .clone()
                .unwrap_or_else(|| "Unknown User".to_string())
        };

        let when = chrono::DateTime::from_timestamp_millis(feedback.timestamp)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let body = serde_json::json!({
            "embeds": [{
                "title": "💬 New Feedback",
                "color": COLOR_BLURPLE,
                "description": feedback.message,
                "fields": [
                    { "name": "👤 From", "value": display_name, "inline": true },
                    { "name": "🕐 Time", "value": when, "inline": true }
                ],
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "footer": { "text": "gsyrocks Feedback" }
            }]
        });

        self.post_message(channel_id, &body).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use belay_core::{DecisionStatus, InboundEmail, ReplyTone, RouteStatus};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DiscordClient {
        DiscordClient::from_config(&DiscordConfig {
            bot_token: Some("token-123".into()),
            api_base: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    fn sample_decision(suspicious: bool, ai_reply: Option<&str>) -> PendingDecision {
        PendingDecision {
            email: InboundEmail {
                id: "email_7".into(),
                from: "climber@example.com".into(),
                to: "hello@gsyrocks.com".into(),
                subject: "Broken hold".into(),
                text: "The third hold on Sunset Arete spins.".into(),
                html: None,
                headers: HashMap::new(),
                attachments: vec![],
                received_at: "2026-08-30T10:00:00Z".into(),
            },
            category: EmailCategory::BugReport,
            suggested_tone: ReplyTone::ApologeticProfessional,
            ai_reply: ai_reply.map(str::to_string),
            status: DecisionStatus::Pending,
            is_suspicious: suspicious,
            created_at: 1,
            updated_at: None,
            reviewed_by: None,
            sent_reply: None,
        }
    }

    #[tokio::test]
    async fn email_card_carries_buttons_and_bot_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/c1/messages"))
            .and(header("Authorization", "Bot token-123"))
            .and(body_partial_json(serde_json::json!({
                "components": [
                    { "components": [
                        { "custom_id": "approve_email_7" },
                        { "custom_id": "reject_email_7" }
                    ]},
                    { "components": [
                        { "custom_id": "edit_email_7" },
                        { "custom_id": "view_email_7" }
                    ]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server)
            .send_email_card("c1", &sample_decision(false, Some("Draft reply")))
            .await
            .unwrap();
        assert_eq!(id, "msg_1");
    }

    #[tokio::test]
    async fn suspicious_card_is_red_with_warning_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "embeds": [{
                    "title": "⚠️ 🐛 New Email - Bug Report",
                    "color": 0xe74c3c_u32,
                    "fields": [{ "name": "⚠️ Warning" }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_email_card("c1", &sample_decision(true, None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn api_error_surfaces_as_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .send_email_card("c1", &sample_decision(false, None))
            .await
            .unwrap_err();
        assert!(matches!(err, BelayError::Http { .. }));
    }

    #[tokio::test]
    async fn route_card_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/routes/messages"))
            .and(body_partial_json(serde_json::json!({
                "components": [{ "components": [
                    { "custom_id": "approve_route_r9" },
                    { "custom_id": "reject_route_r9" }
                ]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_route"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let route = RouteSubmission {
            id: "r9".into(),
            name: "Sunset Arete".into(),
            grade: "6b+".into(),
            image_url: "https://cdn.example.com/r9.jpg".into(),
            latitude: 49.4567891,
            longitude: -2.5412345,
            country: Some("Guernsey".into()),
            region: None,
            town: Some("St Peter Port".into()),
            submitted_by: "alice".into(),
            submitted_by_email: "alice@example.com".into(),
            status: RouteStatus::DiscordPending,
            discord_message_id: None,
            created_at: 1,
            updated_at: None,
            reviewed_by: None,
        };

        let id = client_for(&server)
            .send_route_card("routes", &route)
            .await
            .unwrap();
        assert_eq!(id, "msg_route");
    }

    #[tokio::test]
    async fn anonymous_feedback_hides_the_submitter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "embeds": [{
                    "title": "💬 New Feedback",
                    "fields": [{ "name": "👤 From", "value": "Anonymous" }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_f"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_feedback_embed(
                "fb",
                &FeedbackMessage {
                    message: "Love the new map!".into(),
                    submitted_by: Some("alice".into()),
                    is_anonymous: true,
                    timestamp: 1_756_500_000_000,
                },
            )
            .await
            .unwrap();
    }

    #[test]
    fn missing_bot_token_disables_client() {
        assert!(DiscordClient::from_config(&DiscordConfig::default()).is_none());
    }
}
