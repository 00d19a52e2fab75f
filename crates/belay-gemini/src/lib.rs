// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply drafting via the Gemini generateContent REST API.
//!
//! Drafting is strictly optional: a missing API key means no drafter is
//! constructed at all, a 429 degrades to a fixed placeholder the reviewer
//! can see, and any other failure degrades to "no AI suggestion". Nothing
//! in this crate ever fails the moderation pipeline.

use serde::Deserialize;
use tracing::{debug, warn};

use belay_config::model::GeminiConfig;
use belay_core::{EmailCategory, InboundEmail};

/// Placeholder draft returned when Gemini answers 429. Non-null so the
/// approval card still shows the reviewer something actionable.
pub const RATE_LIMITED_PLACEHOLDER: &str =
    "[AI] Unable to generate reply - rate limit exceeded. Please edit and send a manual reply.";

/// Client for on-demand reply drafts.
pub struct ReplyDrafter {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl ReplyDrafter {
    /// Build a drafter from config. `None` when no API key is configured --
    /// the whole feature is absent, not erroring.
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Draft a reply for an inbound email.
    ///
    /// Returns `None` when the body is too short to reply to, when the API
    /// fails, or when the response carries no text. Returns the fixed
    /// placeholder on 429. Never returns an error.
    pub async fn draft(&self, email: &InboundEmail, category: EmailCategory) -> Option<String> {
        if email.text.trim().len() < 5 {
            debug!("skipping draft: no email content to reply to");
            return None;
        }

        let prompt = build_prompt(email);
        debug!(category = %category, "requesting Gemini draft");

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 500 }
        });

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Gemini request failed");
                return None;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini rate limited, substituting placeholder draft");
            return Some(RATE_LIMITED_PLACEHOLDER.to_string());
        }
        if !status.is_success() {
            warn!(status = %status, "Gemini API error");
            return None;
        }

        let parsed: GenerateResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Gemini response parse failed");
                return None;
            }
        };

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Fixed prompt template instructing a direct, signed-off 100-200 word reply.
fn build_prompt(email: &InboundEmail) -> String {
    format!(
        "Write a direct email reply (100-200 words).\n\n\
         Context: gsyrocks.com is a Guernsey climbing routes website.\n\n\
         Original email:\n\
         Subject: {}\n\
         Content: {}\n\n\
         Requirements:\n\
         - Start directly with greeting (e.g., \"Hi name,\") - no conversational filler\n\
         - Be professional and helpful\n\
         - No \"Here's a draft\" or similar phrases\n\
         - No mention of the original subject line\n\
         - Sign off with \"The gsyrocks Team\"\n\
         - Keep concise and direct\n\n\
         Email reply content:",
        email.subject, email.text
    )
}

/// Template reply used when a decision is approved without an AI draft.
///
/// Derives a salutation from the sender address local part.
pub fn default_reply(from: &str) -> String {
    let local = from.split('@').next().unwrap_or("");
    let name: String = local
        .replace(['.', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "Hi {name},\n\n\
         Thanks for contacting us at gsyrocks.com!\n\n\
         We've received your message and appreciate you reaching out. \
         A team member will review your email and get back to you soon.\n\n\
         Best regards,\n\
         The gsyrocks Team"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn email(text: &str) -> InboundEmail {
        InboundEmail {
            id: "email_1".into(),
            from: "jane.doe@example.com".into(),
            to: "hello@gsyrocks.com".into(),
            subject: "Access question".into(),
            text: text.into(),
            html: None,
            headers: HashMap::new(),
            attachments: vec![],
            received_at: "2026-08-30T00:00:00Z".into(),
        }
    }

    fn drafter(base: &str) -> ReplyDrafter {
        let config = GeminiConfig {
            api_key: Some("test-key".into()),
            api_base: base.into(),
            ..GeminiConfig::default()
        };
        ReplyDrafter::from_config(&config).unwrap()
    }

    #[test]
    fn missing_api_key_yields_no_drafter() {
        assert!(ReplyDrafter::from_config(&GeminiConfig::default()).is_none());
    }

    #[test]
    fn default_reply_title_cases_local_part() {
        let reply = default_reply("jane.doe@example.com");
        assert!(reply.starts_with("Hi Jane Doe,"));
        assert!(reply.ends_with("The gsyrocks Team"));
    }

    #[tokio::test]
    async fn successful_draft_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1beta/models/gemini-2.0-flash-exp:generateContent",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "  Hi Jane,\nSure thing.  " }] } }]
            })))
            .mount(&server)
            .await;

        let draft = drafter(&server.uri())
            .draft(&email("Is the north crag open?"), EmailCategory::Question)
            .await;
        assert_eq!(draft.as_deref(), Some("Hi Jane,\nSure thing."));
    }

    #[tokio::test]
    async fn rate_limit_substitutes_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let draft = drafter(&server.uri())
            .draft(&email("Is the north crag open?"), EmailCategory::Question)
            .await;
        assert_eq!(draft.as_deref(), Some(RATE_LIMITED_PLACEHOLDER));
    }

    #[tokio::test]
    async fn server_error_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let draft = drafter(&server.uri())
            .draft(&email("Is the north crag open?"), EmailCategory::Question)
            .await;
        assert!(draft.is_none());
    }

    #[tokio::test]
    async fn short_body_is_not_drafted() {
        let server = MockServer::start().await;
        let draft = drafter(&server.uri())
            .draft(&email("ok"), EmailCategory::GeneralInquiry)
            .await;
        assert!(draft.is_none());
    }

    #[tokio::test]
    async fn empty_candidates_degrade_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let draft = drafter(&server.uri())
            .draft(&email("Is the north crag open?"), EmailCategory::Question)
            .await;
        assert!(draft.is_none());
    }
}
