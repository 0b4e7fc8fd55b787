// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message container types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::part::Part;

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The author of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Provider-specific accounting attached to a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// Input tokens consumed producing this message.
    #[serde(default)]
    pub input_tokens: u32,
    /// Output tokens generated for this message.
    #[serde(default)]
    pub output_tokens: u32,
    /// Model that generated the message, if an assistant turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Cost in the billing currency, if the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

/// One conversation turn: an ordered sequence of parts.
///
/// Part order is significant and preserved end-to-end -- it reflects
/// temporal generation order (reasoning before tool call before final text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    /// Creates a message with no parts.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: MessageId(id.into()),
            role,
            parts: Vec::new(),
            metadata: None,
        }
    }

    /// Builder-style part append, preserving generation order.
    #[must_use]
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn role_wire_form_round_trip() {
        for role in [Role::User, Role::Assistant, Role::System] {
            let s = role.to_string();
            assert_eq!(Role::from_str(&s).unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            let parsed: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, role);
        }
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), "assistant");
    }

    #[test]
    fn message_without_parts_key_deserializes_empty() {
        let msg: Message = serde_json::from_value(json!({"id": "m1", "role": "user"})).unwrap();
        assert!(msg.parts.is_empty());
        assert!(msg.metadata.is_none());
    }

    #[test]
    fn message_preserves_part_order() {
        let json = json!({
            "id": "m1",
            "role": "assistant",
            "parts": [
                {"type": "step-start"},
                {"type": "reasoning", "text": "think", "state": "done"},
                {"type": "text", "text": "answer", "state": "done"}
            ]
        });
        let msg: Message = serde_json::from_value(json.clone()).unwrap();
        assert!(msg.parts[0].is_step_start());
        assert!(msg.parts[1].is_reasoning());
        assert!(msg.parts[2].is_text());
        assert_eq!(serde_json::to_value(&msg).unwrap(), json);
    }

    #[test]
    fn metadata_defaults_token_counts() {
        let json = json!({
            "id": "m1",
            "role": "assistant",
            "metadata": {"model": "sonnet-4"}
        });
        let msg: Message = serde_json::from_value(json).unwrap();
        let meta = msg.metadata.unwrap();
        assert_eq!(meta.input_tokens, 0);
        assert_eq!(meta.output_tokens, 0);
        assert_eq!(meta.model.as_deref(), Some("sonnet-4"));
    }

    #[test]
    fn with_part_appends_in_order() {
        let msg = Message::new("m1", Role::Assistant)
            .with_part(crate::part::Part::StepStart)
            .with_part(crate::part::Part::Text(crate::part::TextPart::done("hi")));
        assert_eq!(msg.parts.len(), 2);
        assert!(msg.parts[0].is_step_start());
        assert!(msg.parts[1].is_text());
    }
}
