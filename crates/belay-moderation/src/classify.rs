// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-match keyword classifier for inbound emails.
//!
//! Group ordering is significant and must be preserved exactly: a message
//! matching both "urgent" and "bug" keywords is `Urgent`.

use belay_core::EmailCategory;

/// Ordered (category, keywords) groups. Checked top to bottom; the first
/// group with any keyword contained in the lower-cased `subject + text`
/// wins.
const KEYWORD_GROUPS: &[(EmailCategory, &[&str])] = &[
    (
        EmailCategory::Urgent,
        &["urgent", "emergency", "critical", "asap"],
    ),
    (
        EmailCategory::BugReport,
        &["bug", "error", "crash", "broken"],
    ),
    (
        EmailCategory::Partnership,
        &["partnership", "collaboration", "business"],
    ),
    (
        EmailCategory::FeatureRequest,
        &["feature", "request", "suggestion"],
    ),
    (EmailCategory::Feedback, &["feedback", "improvement"]),
    (EmailCategory::Question, &["question", "how", "?"]),
];

/// Classify a message by subject and body text.
///
/// Deterministic, no side effects. Falls through to
/// [`EmailCategory::GeneralInquiry`] when no group matches.
pub fn classify(subject: &str, text: &str) -> EmailCategory {
    let combined = format!("{} {}", subject.to_lowercase(), text.to_lowercase());
    for (category, keywords) in KEYWORD_GROUPS {
        if keywords.iter().any(|k| combined.contains(k)) {
            return *category;
        }
    }
    EmailCategory::GeneralInquiry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_keywords_classify_as_bug_report() {
        assert_eq!(
            classify("Bug: map broken", "it crashes"),
            EmailCategory::BugReport
        );
    }

    #[test]
    fn urgent_beats_bug_when_both_match() {
        assert_eq!(
            classify("URGENT: bug in the map", "crash on load"),
            EmailCategory::Urgent
        );
    }

    #[test]
    fn question_mark_alone_classifies_as_question() {
        assert_eq!(
            classify("Opening hours", "Is the crag open in winter?"),
            EmailCategory::Question
        );
    }

    #[test]
    fn unmatched_text_falls_through_to_general_inquiry() {
        assert_eq!(classify("Hello", "Just saying hi"), EmailCategory::GeneralInquiry);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            classify("PARTNERSHIP OPPORTUNITY", ""),
            EmailCategory::Partnership
        );
    }

    #[test]
    fn feature_before_feedback_ordering() {
        // "request" appears before the feedback group is consulted.
        assert_eq!(
            classify("A request with feedback", ""),
            EmailCategory::FeatureRequest
        );
    }
}
