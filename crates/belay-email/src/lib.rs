// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound transactional email through the Resend REST API.
//!
//! Two message kinds leave the system: approved replies to inbound emails,
//! and notifications to route submitters after a moderation decision. Sends
//! are single-shot; the caller decides how a failure affects record state.

use belay_config::ResendConfig;
use belay_core::{BelayError, InboundEmail};
use serde::Serialize;
use tracing::warn;

/// Resend HTTP client.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from_address: String,
    api_base: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl ResendMailer {
    /// Build from config; `None` when no API key is configured.
    pub fn from_config(config: &ResendConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            from_address: config.from_address.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), BelayError> {
        let request = SendRequest {
            from: &self.from_address,
            to: [to],
            subject,
            text,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| BelayError::Http {
                message: "resend request failed".to_string(),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, %detail, to, "resend rejected send");
            return Err(BelayError::Http {
                message: format!("resend returned {status}"),
                source: None,
            });
        }
        Ok(())
    }

    /// Send an approved reply back to the original sender.
    ///
    /// The subject is the inbound subject prefixed with `Re: `.
    pub async fn send_reply(
        &self,
        email: &InboundEmail,
        reply_text: &str,
    ) -> Result<(), BelayError> {
        let subject = format!("Re: {}", email.subject);
        self.send(&email.from, &subject, reply_text).await
    }

    /// Notify a route submitter of the moderation outcome.
    pub async fn send_route_notification(
        &self,
        to: &str,
        route_name: &str,
        approved: bool,
    ) -> Result<(), BelayError> {
        let (subject, text) = if approved {
            (
                format!("✅ Your route \"{route_name}\" has been approved!"),
                format!(
                    "Great news! Your route \"{route_name}\" has been approved and is now live on the map.\n\nThank you for contributing to gsyrocks.com!"
                ),
            )
        } else {
            (
                format!("❌ Your route \"{route_name}\" was not approved"),
                format!(
                    "Unfortunately, your route \"{route_name}\" was not approved.\n\nIf you believe this is an error, please feel free to resubmit with additional information.\n\nThank you for trying!"
                ),
            )
        };
        self.send(to, &subject, &text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mailer_for(server: &MockServer) -> ResendMailer {
        ResendMailer::from_config(&ResendConfig {
            api_key: Some("re_test".into()),
            from_address: "gsyrocks.com <hello@gsyrocks.com>".into(),
            api_base: server.uri(),
        })
        .unwrap()
    }

    fn inbound(subject: &str) -> InboundEmail {
        InboundEmail {
            id: "email_1".into(),
            from: "climber@example.com".into(),
            to: "hello@gsyrocks.com".into(),
            subject: subject.into(),
            text: "body".into(),
            html: None,
            headers: HashMap::new(),
            attachments: vec![],
            received_at: "2026-08-30T10:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn reply_goes_to_sender_with_re_subject() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("Authorization", "Bearer re_test"))
            .and(body_partial_json(serde_json::json!({
                "from": "gsyrocks.com <hello@gsyrocks.com>",
                "to": ["climber@example.com"],
                "subject": "Re: Broken hold",
                "text": "We will fix it this week."
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "send_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        mailer_for(&server)
            .send_reply(&inbound("Broken hold"), "We will fix it this week.")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn approval_notification_uses_approved_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "to": ["alice@example.com"],
                "subject": "✅ Your route \"Sunset Arete\" has been approved!"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "send_2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        mailer_for(&server)
            .send_route_notification("alice@example.com", "Sunset Arete", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejection_notification_uses_rejected_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "subject": "❌ Your route \"Sunset Arete\" was not approved"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "send_3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        mailer_for(&server)
            .send_route_notification("alice@example.com", "Sunset Arete", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn api_error_surfaces_as_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let err = mailer_for(&server)
            .send_reply(&inbound("Hi"), "text")
            .await
            .unwrap_err();
        assert!(matches!(err, BelayError::Http { .. }));
    }

    #[test]
    fn missing_api_key_disables_mailer() {
        assert!(ResendMailer::from_config(&ResendConfig::default()).is_none());
    }
}
