// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message admission control.
//!
//! Checks run in a fixed order and short-circuit on the first failure:
//! thread-reply filter, size limit, per-sender daily rate limit, then the
//! suspicious-content heuristic (which only flags, never blocks).

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use belay_config::model::ModerationConfig;
use belay_core::traits::kv::TTL_RATE_COUNTER;
use belay_core::types::{rate_key, today_utc};
use belay_core::{InboundEmail, KvStore};

static RE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^re:\s").expect("static regex"));

static SPAM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(viagra|casino|lottery|winner|inheritance|million dollars)\b",
        r"(?i)click here.*now",
        r"(?i)verify.*account.*urgent",
        r"(?i)bank.*transfer.*urgent",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("static regex"));

/// Outcome of the admission checks for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    /// Reply to an existing thread; dropped silently (noise, not spam).
    ThreadReply,
    /// Rejected outright; the reason is audit-logged.
    Rejected { reason: String },
    /// Admitted into the pipeline. `suspicious` means a human should be
    /// warned but processing continues.
    Admitted { suspicious: bool },
}

/// Sequential admission gate for inbound emails.
pub struct SpamGate {
    max_per_day: u32,
    max_size_bytes: usize,
}

impl SpamGate {
    /// Build a gate from the moderation config section.
    pub fn new(config: &ModerationConfig) -> Self {
        Self {
            max_per_day: config.max_emails_per_day,
            max_size_bytes: config.max_email_size_kb * 1024,
        }
    }

    /// Run all checks against one message.
    ///
    /// The rate-limit check needs the KV store; when no store is configured
    /// the check is skipped (degraded, not fatal). Counter increments are
    /// atomic, so concurrent deliveries from one sender cannot both slip
    /// under the ceiling.
    pub async fn check(&self, email: &InboundEmail, kv: Option<&dyn KvStore>) -> GateVerdict {
        if is_thread_reply(email) {
            return GateVerdict::ThreadReply;
        }

        let html_len = email.html.as_deref().map_or(0, str::len);
        let total_size = (email.text.len() + html_len) * 2;
        if total_size > self.max_size_bytes {
            return GateVerdict::Rejected {
                reason: format!(
                    "Email too large: {}KB (limit: {}KB)",
                    total_size / 1024,
                    self.max_size_bytes / 1024
                ),
            };
        }

        if let Some(kv) = kv {
            let sender = email.sender_identity();
            let key = rate_key(&sender, &today_utc());
            match kv.incr(&key, Some(TTL_RATE_COUNTER)).await {
                Ok(count) if count > i64::from(self.max_per_day) => {
                    return GateVerdict::Rejected {
                        reason: format!(
                            "Rate limit exceeded: {count} emails today (limit: {})",
                            self.max_per_day
                        ),
                    };
                }
                Ok(count) => debug!(sender = %sender, count, "rate counter advanced"),
                // Rate limiting is best-effort: a store failure admits the
                // message rather than dropping legitimate mail.
                Err(e) => warn!(error = %e, "rate limit check failed, admitting"),
            }
        } else {
            debug!("kv store not configured, skipping rate limit");
        }

        GateVerdict::Admitted {
            suspicious: is_suspicious_content(&email.subject, &email.text),
        }
    }
}

/// Whether the message is a reply within an existing thread.
///
/// True when `In-Reply-To`/`References` headers are non-empty or the
/// subject carries a `Re:` prefix. Header names are lower-cased at the
/// webhook boundary.
fn is_thread_reply(email: &InboundEmail) -> bool {
    let header_nonempty =
        |name: &str| email.headers.get(name).is_some_and(|v| !v.is_empty());
    header_nonempty("in-reply-to")
        || header_nonempty("references")
        || RE_PREFIX.is_match(&email.subject)
}

/// Heuristic flag for content a human should review carefully.
///
/// Does not block: known spam phrases, a >70% uppercase-letter ratio, or
/// more than 10 URLs set the flag and processing continues.
fn is_suspicious_content(subject: &str, text: &str) -> bool {
    let combined = format!("{subject} {text}");
    if SPAM_PATTERNS.iter().any(|p| p.is_match(&combined)) {
        return true;
    }

    let upper = text.chars().filter(|c| c.is_ascii_uppercase()).count();
    let excessive_caps = upper as f64 / (text.chars().count().max(1)) as f64 > 0.7;

    let many_links = URL_PATTERN.find_iter(text).count() > 10;

    excessive_caps || many_links
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use belay_kv::MemoryKv;

    use super::*;

    fn gate() -> SpamGate {
        SpamGate::new(&ModerationConfig::default())
    }

    fn email(subject: &str, text: &str) -> InboundEmail {
        InboundEmail {
            id: "email_test".into(),
            from: "Climber <climber@example.com>".into(),
            to: "hello@gsyrocks.com".into(),
            subject: subject.into(),
            text: text.into(),
            html: None,
            headers: HashMap::new(),
            attachments: vec![],
            received_at: "2026-08-30T00:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn plain_email_is_admitted() {
        let verdict = gate().check(&email("Hello", "I love the site"), None).await;
        assert_eq!(verdict, GateVerdict::Admitted { suspicious: false });
    }

    #[tokio::test]
    async fn re_subject_is_dropped_as_thread_reply() {
        let verdict = gate().check(&email("Re: earlier mail", "body"), None).await;
        assert_eq!(verdict, GateVerdict::ThreadReply);
    }

    #[tokio::test]
    async fn references_header_is_dropped_as_thread_reply() {
        let mut e = email("Fresh subject", "body");
        e.headers
            .insert("references".into(), "<msg-1@example.com>".into());
        assert_eq!(gate().check(&e, None).await, GateVerdict::ThreadReply);
    }

    #[tokio::test]
    async fn empty_references_header_does_not_drop() {
        let mut e = email("Fresh subject", "body");
        e.headers.insert("references".into(), String::new());
        assert_eq!(
            gate().check(&e, None).await,
            GateVerdict::Admitted { suspicious: false }
        );
    }

    #[tokio::test]
    async fn oversized_email_is_rejected() {
        // (text + html) * 2 over the 100 KiB default.
        let e = email("Big", &"x".repeat(60 * 1024));
        match gate().check(&e, None).await {
            GateVerdict::Rejected { reason } => assert!(reason.contains("too large")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn eleventh_message_from_same_sender_is_rejected() {
        let kv = MemoryKv::new();
        let g = gate();
        for i in 0..10 {
            let verdict = g.check(&email(&format!("msg {i}"), "hi"), Some(&kv)).await;
            assert!(matches!(verdict, GateVerdict::Admitted { .. }), "message {i}");
        }
        match g.check(&email("msg 10", "hi"), Some(&kv)).await {
            GateVerdict::Rejected { reason } => assert!(reason.contains("Rate limit")),
            other => panic!("expected rate limit rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_is_per_sender() {
        let kv = MemoryKv::new();
        let g = gate();
        for i in 0..10 {
            g.check(&email(&format!("msg {i}"), "hi"), Some(&kv)).await;
        }
        let mut other = email("from someone else", "hi");
        other.from = "other@example.com".into();
        assert!(matches!(
            g.check(&other, Some(&kv)).await,
            GateVerdict::Admitted { .. }
        ));
    }

    #[tokio::test]
    async fn spam_phrases_flag_but_do_not_block() {
        let verdict = gate()
            .check(&email("You are a winner", "claim your lottery prize"), None)
            .await;
        assert_eq!(verdict, GateVerdict::Admitted { suspicious: true });
    }

    #[tokio::test]
    async fn shouting_text_is_flagged() {
        let verdict = gate()
            .check(&email("hi", "BUY NOW THIS IS GREAT STUFF FOR YOU"), None)
            .await;
        assert_eq!(verdict, GateVerdict::Admitted { suspicious: true });
    }

    #[tokio::test]
    async fn many_urls_are_flagged() {
        let links = "see https://a.example.com ".repeat(11);
        let verdict = gate().check(&email("links", &links), None).await;
        assert_eq!(verdict, GateVerdict::Admitted { suspicious: true });
    }
}
