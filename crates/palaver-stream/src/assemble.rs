// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stream-to-parts fold.

use palaver_core::{PalaverError, Part, ReasoningPart, TextPart, ToolPart};
use tracing::debug;

use crate::event::StreamEvent;

/// Folds stream events into an ordered part sequence.
///
/// Every transition builds a new part value and replaces the stored one;
/// regressions (a delta after the part finalized, output for a terminal
/// tool) surface as [`PalaverError::InvalidTransition`] from the state
/// machines. Part order is generation order and is never rearranged.
///
/// Tool calls are assembled as generic [`ToolPart`]s regardless of name; a
/// `search` call serializes under the `tool-search` tag and narrows into the
/// typed search variant when the persisted message is decoded.
#[derive(Debug, Default)]
pub struct MessageAssembler {
    parts: Vec<Part>,
}

impl MessageAssembler {
    /// Creates an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// The parts assembled so far, in generation order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Applies one stream event.
    pub fn apply(&mut self, event: StreamEvent) -> Result<(), PalaverError> {
        match event {
            StreamEvent::StepStart => self.parts.push(Part::StepStart),
            StreamEvent::TextDelta { text } => {
                let appended = match self.parts.last() {
                    Some(Part::Text(last)) if !last.is_done() => {
                        Some(Part::Text(last.append(&text)?))
                    }
                    _ => None,
                };
                self.push_or_replace_last(appended, || Part::Text(TextPart::streaming(text)));
            }
            StreamEvent::TextEnd => {
                let finished = match self.parts.last() {
                    Some(Part::Text(last)) if !last.is_done() => {
                        Part::Text(last.clone().finish())
                    }
                    _ => {
                        return Err(PalaverError::Internal(
                            "text-end without an open text part".into(),
                        ));
                    }
                };
                self.replace_last(finished);
            }
            StreamEvent::ReasoningDelta { text } => {
                let appended = match self.parts.last() {
                    Some(Part::Reasoning(last)) if !last.is_done() => {
                        Some(Part::Reasoning(last.append(&text)?))
                    }
                    _ => None,
                };
                self.push_or_replace_last(appended, || {
                    Part::Reasoning(ReasoningPart::streaming(text))
                });
            }
            StreamEvent::ReasoningEnd => {
                let finished = match self.parts.last() {
                    Some(Part::Reasoning(last)) if !last.is_done() => {
                        Part::Reasoning(last.clone().finish())
                    }
                    _ => {
                        return Err(PalaverError::Internal(
                            "reasoning-end without an open reasoning part".into(),
                        ));
                    }
                };
                self.replace_last(finished);
            }
            StreamEvent::ToolInputStart { tool, tool_call_id } => {
                debug!(tool = %tool, tool_call_id = %tool_call_id, "tool call opened");
                self.parts
                    .push(Part::Tool(ToolPart::input_streaming(tool, tool_call_id)));
            }
            StreamEvent::ToolInputAvailable {
                tool_call_id,
                input,
            } => self.advance_tool(&tool_call_id, |tool| tool.with_input(input))?,
            StreamEvent::ToolOutputAvailable {
                tool_call_id,
                output,
            } => self.advance_tool(&tool_call_id, |tool| tool.with_output(output))?,
            StreamEvent::ToolOutputError {
                tool_call_id,
                error_text,
            } => self.advance_tool(&tool_call_id, |tool| tool.with_error(error_text))?,
            StreamEvent::File { part } => self.parts.push(Part::File(part)),
            StreamEvent::SourceUrl { part } => self.parts.push(Part::SourceUrl(part)),
        }
        Ok(())
    }

    /// Finalizes any still-streaming text and reasoning parts and returns
    /// the sequence in generation order.
    pub fn finish(self) -> Vec<Part> {
        self.parts
            .into_iter()
            .map(|part| match part {
                Part::Text(text) => Part::Text(text.finish()),
                Part::Reasoning(reasoning) => Part::Reasoning(reasoning.finish()),
                other => other,
            })
            .collect()
    }

    fn push_or_replace_last(&mut self, updated: Option<Part>, open: impl FnOnce() -> Part) {
        match updated {
            Some(part) => self.replace_last(part),
            None => self.parts.push(open()),
        }
    }

    fn replace_last(&mut self, part: Part) {
        let last = self.parts.len() - 1;
        self.parts[last] = part;
    }

    fn advance_tool(
        &mut self,
        tool_call_id: &str,
        transition: impl FnOnce(ToolPart) -> Result<ToolPart, PalaverError>,
    ) -> Result<(), PalaverError> {
        let index = self
            .parts
            .iter()
            .rposition(|part| part.tool_call_id() == Some(tool_call_id))
            .ok_or_else(|| PalaverError::UnknownToolCall {
                tool_call_id: tool_call_id.to_owned(),
            })?;
        let updated = match &self.parts[index] {
            Part::Tool(tool) => transition(tool.clone())?,
            _ => {
                return Err(PalaverError::UnknownToolCall {
                    tool_call_id: tool_call_id.to_owned(),
                });
            }
        };
        self.parts[index] = Part::Tool(updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use palaver_core::{StreamState, ToolState};
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn assembles_reasoning_tool_text_in_order() {
        let mut assembler = MessageAssembler::new();
        for event in [
            StreamEvent::StepStart,
            StreamEvent::ReasoningDelta {
                text: "Need the ".into(),
            },
            StreamEvent::ReasoningDelta {
                text: "forecast.".into(),
            },
            StreamEvent::ReasoningEnd,
            StreamEvent::ToolInputStart {
                tool: "weather".into(),
                tool_call_id: "call-1".into(),
            },
            StreamEvent::ToolInputAvailable {
                tool_call_id: "call-1".into(),
                input: json!({"city": "Oslo"}),
            },
            StreamEvent::ToolOutputAvailable {
                tool_call_id: "call-1".into(),
                output: json!({"temp": -3}),
            },
            StreamEvent::TextDelta {
                text: "It is ".into(),
            },
            StreamEvent::TextDelta {
                text: "cold.".into(),
            },
        ] {
            assembler.apply(event).unwrap();
        }

        let parts = assembler.finish();
        assert_eq!(parts.len(), 4);
        assert!(parts[0].is_step_start());
        match &parts[1] {
            Part::Reasoning(reasoning) => {
                assert_eq!(reasoning.text, "Need the forecast.");
                assert_eq!(reasoning.state, Some(StreamState::Done));
            }
            other => panic!("expected reasoning, got {other:?}"),
        }
        match &parts[2] {
            Part::Tool(tool) => {
                assert_eq!(tool.tool, "weather");
                assert_eq!(tool.state, ToolState::OutputAvailable);
                assert_eq!(tool.output, Some(json!({"temp": -3})));
            }
            other => panic!("expected tool, got {other:?}"),
        }
        match &parts[3] {
            Part::Text(text) => {
                assert_eq!(text.text, "It is cold.");
                // finish() finalized the still-streaming text part.
                assert_eq!(text.state, Some(StreamState::Done));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn text_delta_after_text_end_opens_a_new_part() {
        let mut assembler = MessageAssembler::new();
        assembler
            .apply(StreamEvent::TextDelta { text: "one".into() })
            .unwrap();
        assembler.apply(StreamEvent::TextEnd).unwrap();
        assembler
            .apply(StreamEvent::TextDelta { text: "two".into() })
            .unwrap();

        let parts = assembler.finish();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_text().unwrap().text, "one");
        assert_eq!(parts[1].as_text().unwrap().text, "two");
    }

    #[test]
    fn text_end_without_open_part_is_an_error() {
        let mut assembler = MessageAssembler::new();
        let err = assembler.apply(StreamEvent::TextEnd).unwrap_err();
        assert!(matches!(err, PalaverError::Internal(_)));
    }

    #[test]
    fn unknown_tool_call_id_is_an_error() {
        let mut assembler = MessageAssembler::new();
        let err = assembler
            .apply(StreamEvent::ToolOutputAvailable {
                tool_call_id: "call-404".into(),
                output: json!({}),
            })
            .unwrap_err();
        assert!(matches!(err, PalaverError::UnknownToolCall { .. }));
    }

    #[test]
    fn tool_output_after_terminal_is_rejected() {
        let mut assembler = MessageAssembler::new();
        assembler
            .apply(StreamEvent::ToolInputStart {
                tool: "weather".into(),
                tool_call_id: "call-1".into(),
            })
            .unwrap();
        assembler
            .apply(StreamEvent::ToolOutputError {
                tool_call_id: "call-1".into(),
                error_text: "upstream timed out".into(),
            })
            .unwrap();
        let err = assembler
            .apply(StreamEvent::ToolOutputAvailable {
                tool_call_id: "call-1".into(),
                output: json!({"late": true}),
            })
            .unwrap_err();
        assert!(matches!(err, PalaverError::InvalidTransition { .. }));
        // The failed transition left the part untouched.
        match &assembler.parts()[0] {
            Part::Tool(tool) => assert_eq!(tool.state, ToolState::OutputError),
            other => panic!("expected tool, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_tool_calls_are_addressed_by_id() {
        let mut assembler = MessageAssembler::new();
        for id in ["call-a", "call-b"] {
            assembler
                .apply(StreamEvent::ToolInputStart {
                    tool: "search".into(),
                    tool_call_id: id.into(),
                })
                .unwrap();
        }
        assembler
            .apply(StreamEvent::ToolOutputAvailable {
                tool_call_id: "call-a".into(),
                output: json!({"results": []}),
            })
            .unwrap();

        let parts = assembler.finish();
        match (&parts[0], &parts[1]) {
            (Part::Tool(a), Part::Tool(b)) => {
                assert_eq!(a.state, ToolState::OutputAvailable);
                assert_eq!(b.state, ToolState::InputStreaming);
            }
            other => panic!("expected two tool parts, got {other:?}"),
        }
    }

    #[test]
    fn search_tool_round_trips_into_typed_variant() {
        let mut assembler = MessageAssembler::new();
        assembler
            .apply(StreamEvent::ToolInputStart {
                tool: "search".into(),
                tool_call_id: "call-1".into(),
            })
            .unwrap();
        assembler
            .apply(StreamEvent::ToolInputAvailable {
                tool_call_id: "call-1".into(),
                input: json!({"query": "rust enums"}),
            })
            .unwrap();
        assembler
            .apply(StreamEvent::ToolOutputAvailable {
                tool_call_id: "call-1".into(),
                output: json!({"results": [{"url": "https://example.com"}]}),
            })
            .unwrap();

        let parts = assembler.finish();
        let encoded = serde_json::to_value(&parts).unwrap();
        assert_eq!(encoded[0]["type"], "tool-search");

        // Decoding the persisted form narrows to the typed search variant.
        let decoded: Vec<Part> = serde_json::from_value(encoded).unwrap();
        match &decoded[0] {
            Part::ToolSearch(search) => {
                assert_eq!(search.input.as_ref().unwrap().query, "rust enums");
                assert_eq!(search.output.as_ref().unwrap().results.len(), 1);
            }
            other => panic!("expected search tool, got {other:?}"),
        }
    }

    fn any_event() -> impl Strategy<Value = StreamEvent> {
        let call_id = prop_oneof![Just("call-a"), Just("call-b")];
        prop_oneof![
            Just(StreamEvent::StepStart),
            "[a-z ]{1,8}".prop_map(|text| StreamEvent::TextDelta { text }),
            Just(StreamEvent::TextEnd),
            "[a-z ]{1,8}".prop_map(|text| StreamEvent::ReasoningDelta { text }),
            Just(StreamEvent::ReasoningEnd),
            call_id.clone().prop_map(|id| StreamEvent::ToolInputStart {
                tool: "weather".into(),
                tool_call_id: id.into(),
            }),
            call_id.clone().prop_map(|id| StreamEvent::ToolInputAvailable {
                tool_call_id: id.into(),
                input: json!({"city": "Oslo"}),
            }),
            call_id.clone().prop_map(|id| StreamEvent::ToolOutputAvailable {
                tool_call_id: id.into(),
                output: json!({"temp": -3}),
            }),
            call_id.prop_map(|id| StreamEvent::ToolOutputError {
                tool_call_id: id.into(),
                error_text: "upstream timed out".into(),
            }),
        ]
    }

    proptest! {
        /// Folding any event sequence is append-only: existing parts keep
        /// their position and tag, terminal tool states never change, and
        /// whether an event is accepted or rejected the sequence stays
        /// well-formed. After finish() nothing is left streaming.
        #[test]
        fn event_folding_is_append_only_and_respects_terminals(
            events in proptest::collection::vec(any_event(), 0..24),
        ) {
            let mut assembler = MessageAssembler::new();
            for event in events {
                let before = assembler.parts().to_vec();
                let _ = assembler.apply(event);
                let after = assembler.parts();
                prop_assert!(after.len() >= before.len());
                for (prev, cur) in before.iter().zip(after) {
                    prop_assert_eq!(prev.tag(), cur.tag());
                    if let (Part::Tool(prev_tool), Part::Tool(cur_tool)) = (prev, cur) {
                        if prev_tool.state.is_terminal() {
                            prop_assert_eq!(prev_tool.state, cur_tool.state);
                        }
                    }
                }
            }
            for part in assembler.finish() {
                match part {
                    Part::Text(text) => prop_assert!(text.is_done()),
                    Part::Reasoning(reasoning) => prop_assert!(reasoning.is_done()),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn file_and_source_url_events_append_parts() {
        let mut assembler = MessageAssembler::new();
        assembler
            .apply(
                serde_json::from_value(json!({
                    "type": "file",
                    "mediaType": "image/png",
                    "url": "https://cdn.example.com/p.png"
                }))
                .unwrap(),
            )
            .unwrap();
        assembler
            .apply(
                serde_json::from_value(json!({
                    "type": "source-url",
                    "sourceId": "src-1",
                    "url": "https://example.com",
                    "title": "Example"
                }))
                .unwrap(),
            )
            .unwrap();

        let parts = assembler.finish();
        assert!(parts[0].is_file());
        assert!(parts[1].is_source_url());
    }
}
