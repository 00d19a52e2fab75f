// SPDX-FileCopyrightText: 2026 Belay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction callback payloads as a validated discriminated union.
//!
//! Discord delivers interactions as loosely-shaped JSON discriminated by a
//! numeric `type`. The raw shape is deserialized at the boundary and
//! converted into [`Interaction`], so the router and action handlers only
//! ever see well-formed variants.

use serde::Deserialize;

/// Parsed action encoded in a button `custom_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
    Edit,
    View,
    ApproveRoute,
    RejectRoute,
}

/// A validated interaction callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Liveness check; answered with a pong.
    Ping,
    /// A button click on an approval card.
    ButtonClick {
        action: Action,
        id: String,
        user_id: String,
    },
    /// Submission of the edit modal with the operator-corrected reply.
    ModalSubmit {
        id: String,
        reply: String,
        user_id: String,
    },
}

/// Why a callback body could not be turned into an [`Interaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Body is not valid JSON or lacks the discriminator.
    Malformed(String),
    /// Discriminator value this service does not handle.
    UnsupportedType(u8),
    /// `custom_id` missing or its action prefix unknown.
    UnknownAction(String),
    /// Modal submission without a reply text field.
    MissingReply,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Malformed(detail) => write!(f, "malformed interaction: {detail}"),
            ParseError::UnsupportedType(t) => write!(f, "unsupported interaction type {t}"),
            ParseError::UnknownAction(id) => write!(f, "unknown action in custom_id `{id}`"),
            ParseError::MissingReply => write!(f, "modal submission without reply content"),
        }
    }
}

const TYPE_PING: u8 = 1;
const TYPE_BUTTON_CLICK: u8 = 3;
const TYPE_MODAL_SUBMIT: u8 = 5;

#[derive(Debug, Deserialize)]
struct RawInteraction {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    data: Option<RawData>,
    #[serde(default)]
    member: Option<RawMember>,
    #[serde(default)]
    user: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    #[serde(default)]
    custom_id: Option<String>,
    #[serde(default)]
    components: Vec<RawActionRow>,
}

#[derive(Debug, Deserialize)]
struct RawActionRow {
    #[serde(default)]
    components: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    #[serde(default)]
    user: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
}

impl RawInteraction {
    /// Acting user: guild interactions carry `member.user`, DMs carry `user`.
    fn user_id(&self) -> String {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.id.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Parse and validate a raw callback body.
pub fn parse_interaction(body: &str) -> Result<Interaction, ParseError> {
    let raw: RawInteraction =
        serde_json::from_str(body).map_err(|e| ParseError::Malformed(e.to_string()))?;

    match raw.kind {
        TYPE_PING => Ok(Interaction::Ping),
        TYPE_BUTTON_CLICK => {
            let custom_id = raw
                .data
                .as_ref()
                .and_then(|d| d.custom_id.clone())
                .ok_or_else(|| ParseError::UnknownAction(String::new()))?;
            let (action, id) = parse_custom_id(&custom_id)
                .ok_or_else(|| ParseError::UnknownAction(custom_id.clone()))?;
            Ok(Interaction::ButtonClick {
                action,
                id,
                user_id: raw.user_id(),
            })
        }
        TYPE_MODAL_SUBMIT => {
            let data = raw
                .data
                .as_ref()
                .ok_or_else(|| ParseError::UnknownAction(String::new()))?;
            let custom_id = data
                .custom_id
                .clone()
                .ok_or_else(|| ParseError::UnknownAction(String::new()))?;
            let id = custom_id
                .strip_prefix("edit_modal_")
                .ok_or_else(|| ParseError::UnknownAction(custom_id.clone()))?
                .to_string();
            let reply = data
                .components
                .iter()
                .flat_map(|row| row.components.iter())
                .find_map(|c| c.value.clone())
                .filter(|v| !v.trim().is_empty())
                .ok_or(ParseError::MissingReply)?;
            Ok(Interaction::ModalSubmit {
                id,
                reply,
                user_id: raw.user_id(),
            })
        }
        other => Err(ParseError::UnsupportedType(other)),
    }
}

/// Split a button `custom_id` into action and record id.
///
/// Longest prefixes first: `approve_route_` must win over `approve_`.
fn parse_custom_id(custom_id: &str) -> Option<(Action, String)> {
    const PREFIXES: &[(&str, Action)] = &[
        ("approve_route_", Action::ApproveRoute),
        ("reject_route_", Action::RejectRoute),
        ("approve_", Action::Approve),
        ("reject_", Action::Reject),
        ("edit_", Action::Edit),
        ("view_", Action::View),
    ];
    for (prefix, action) in PREFIXES {
        if let Some(id) = custom_id.strip_prefix(prefix)
            && !id.is_empty()
        {
            return Some((*action, id.to_string()));
        }
    }
    None
}

// --- Response builders ---

/// `{type:1}` pong for the liveness check.
pub fn pong() -> serde_json::Value {
    serde_json::json!({ "type": 1 })
}

/// An ephemeral (operator-only) message response.
pub fn ephemeral(content: &str) -> serde_json::Value {
    serde_json::json!({
        "type": 4,
        "data": { "content": content, "flags": 64 }
    })
}

/// A modal response prefilling the reply editor.
pub fn modal(decision_id: &str, prefill: &str) -> serde_json::Value {
    serde_json::json!({
        "type": 9,
        "data": {
            "custom_id": format!("edit_modal_{decision_id}"),
            "title": "Edit Email Reply",
            "components": [{
                "type": 1,
                "components": [{
                    "type": 4,
                    "custom_id": "reply_content",
                    "label": "Reply Content",
                    "style": 2,
                    "value": prefill,
                    "required": true,
                    "min_length": 10,
                    "max_length": 4000
                }]
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_parses_regardless_of_extra_fields() {
        let interaction = parse_interaction(r#"{"type":1,"unexpected":"stuff"}"#).unwrap();
        assert_eq!(interaction, Interaction::Ping);
    }

    #[test]
    fn button_click_parses_action_and_user() {
        let body = r#"{
            "type": 3,
            "data": { "custom_id": "approve_email_123" },
            "member": { "user": { "id": "operator-1" } }
        }"#;
        assert_eq!(
            parse_interaction(body).unwrap(),
            Interaction::ButtonClick {
                action: Action::Approve,
                id: "email_123".into(),
                user_id: "operator-1".into(),
            }
        );
    }

    #[test]
    fn route_prefix_wins_over_plain_approve() {
        let body = r#"{"type":3,"data":{"custom_id":"approve_route_r42"},"user":{"id":"u"}}"#;
        assert_eq!(
            parse_interaction(body).unwrap(),
            Interaction::ButtonClick {
                action: Action::ApproveRoute,
                id: "r42".into(),
                user_id: "u".into(),
            }
        );
    }

    #[test]
    fn dm_interactions_use_top_level_user() {
        let body = r#"{"type":3,"data":{"custom_id":"view_e1"},"user":{"id":"dm-user"}}"#;
        match parse_interaction(body).unwrap() {
            Interaction::ButtonClick { user_id, .. } => assert_eq!(user_id, "dm-user"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_user_falls_back_to_unknown() {
        let body = r#"{"type":3,"data":{"custom_id":"reject_e1"}}"#;
        match parse_interaction(body).unwrap() {
            Interaction::ButtonClick { user_id, .. } => assert_eq!(user_id, "unknown"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_custom_id_prefix_is_rejected() {
        let body = r#"{"type":3,"data":{"custom_id":"snooze_e1"}}"#;
        assert!(matches!(
            parse_interaction(body),
            Err(ParseError::UnknownAction(_))
        ));
    }

    #[test]
    fn modal_submit_extracts_reply_text() {
        let body = r#"{
            "type": 5,
            "data": {
                "custom_id": "edit_modal_email_9",
                "components": [{ "components": [{ "value": "Corrected reply text" }] }]
            },
            "member": { "user": { "id": "editor" } }
        }"#;
        assert_eq!(
            parse_interaction(body).unwrap(),
            Interaction::ModalSubmit {
                id: "email_9".into(),
                reply: "Corrected reply text".into(),
                user_id: "editor".into(),
            }
        );
    }

    #[test]
    fn modal_submit_without_text_is_rejected() {
        let body = r#"{"type":5,"data":{"custom_id":"edit_modal_e1","components":[]}}"#;
        assert_eq!(parse_interaction(body), Err(ParseError::MissingReply));
    }

    #[test]
    fn unsupported_type_is_rejected() {
        assert_eq!(
            parse_interaction(r#"{"type":2}"#),
            Err(ParseError::UnsupportedType(2))
        );
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(matches!(
            parse_interaction("not json"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn pong_and_ephemeral_shapes() {
        assert_eq!(pong(), serde_json::json!({"type":1}));
        let resp = ephemeral("done");
        assert_eq!(resp["type"], 4);
        assert_eq!(resp["data"]["flags"], 64);
    }

    #[test]
    fn modal_prefills_draft() {
        let resp = modal("email_1", "Draft text here");
        assert_eq!(resp["type"], 9);
        assert_eq!(resp["data"]["custom_id"], "edit_modal_email_1");
        assert_eq!(
            resp["data"]["components"][0]["components"][0]["value"],
            "Draft text here"
        );
    }
}
