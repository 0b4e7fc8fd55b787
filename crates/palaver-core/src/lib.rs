// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Palaver chat-message pipeline.
//!
//! Defines the message/part data model shared by the classifier, sanitizer,
//! and stream-assembly crates: the tagged [`Part`] union, the forward-only
//! streaming state machines, and the [`Message`] container.

pub mod error;
pub mod message;
pub mod part;
pub mod state;

// Re-export key items at crate root for ergonomic imports.
pub use error::PalaverError;
pub use message::{Message, MessageId, MessageMetadata, Role};
pub use part::{
    FilePart, Part, ReasoningPart, SearchInput, SearchOutput, SearchToolPart, SourceUrlPart,
    TextPart, ToolPart,
};
pub use state::{StreamState, ToolState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palaver_error_has_all_variants() {
        let _transition = PalaverError::InvalidTransition {
            from: "done".into(),
            to: "streaming".into(),
        };
        let _unknown = PalaverError::UnknownToolCall {
            tool_call_id: "call-1".into(),
        };
        let _internal = PalaverError::Internal("test".into());
    }

    #[test]
    fn error_display_messages() {
        let err = PalaverError::InvalidTransition {
            from: "output-available".into(),
            to: "input-streaming".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid state transition: output-available -> input-streaming"
        );

        let err = PalaverError::UnknownToolCall {
            tool_call_id: "call-7".into(),
        };
        assert_eq!(err.to_string(), "unknown tool call: call-7");
    }

    #[test]
    fn key_types_are_exported_at_root() {
        let msg = Message::new("m1", Role::User).with_part(Part::Text(TextPart::done("hi")));
        assert_eq!(msg.id, MessageId("m1".into()));
        assert_eq!(msg.parts[0].as_text().unwrap().state, Some(StreamState::Done));
    }
}
