// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message part model.
//!
//! A [`Part`] is one discriminated unit of message content: text, a
//! reasoning trace, a tool invocation, a file attachment, a source citation,
//! or a step marker. On the wire a part is a JSON object discriminated by a
//! `type` tag. Tool parts use a templated tag (`tool-<name>`) because the
//! tool set is plugin-defined and open-ended: the one well-known tool
//! (`search`) gets a closed, precisely-typed variant, and every other tool
//! shares the generic [`ToolPart`] contract with the name carried in the tag.
//!
//! Decoding is permissive by policy: a payload whose tag is unrecognized, or
//! whose body does not match its declared tag's shape, becomes
//! [`Part::Unknown`] carrying the original JSON verbatim. Upstream provider
//! schemas drift, and the display/redaction layer must not be the thing that
//! breaks when they do. Drift is logged at debug level so it stays
//! observable.

use std::mem;

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::PalaverError;
use crate::state::{StreamState, ToolState};

/// Tag prefix for generic tool parts.
pub const TOOL_TAG_PREFIX: &str = "tool-";

const TEXT_TAG: &str = "text";
const REASONING_TAG: &str = "reasoning";
const SEARCH_TOOL_TAG: &str = "tool-search";
const FILE_TAG: &str = "file";
const SOURCE_URL_TAG: &str = "source-url";
const STEP_START_TAG: &str = "step-start";

/// Final assistant or user text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPart {
    pub text: String,
    /// Absent in records that predate streaming state tracking; absence
    /// means finalized, and serialization preserves the absence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StreamState>,
}

impl TextPart {
    /// Opens a text part that is still receiving deltas.
    pub fn streaming(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: Some(StreamState::Streaming),
        }
    }

    /// Creates an already-finalized text part.
    pub fn done(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: Some(StreamState::Done),
        }
    }

    /// True unless the part is still streaming.
    pub fn is_done(&self) -> bool {
        self.state.unwrap_or_default().is_done()
    }

    /// Returns a new part with `delta` appended. Rejects appends to a
    /// finalized part.
    pub fn append(&self, delta: &str) -> Result<Self, PalaverError> {
        let state = self
            .state
            .unwrap_or_default()
            .advance_to(StreamState::Streaming)?;
        let mut text = self.text.clone();
        text.push_str(delta);
        Ok(Self {
            text,
            state: Some(state),
        })
    }

    /// Finalizes the part. Idempotent.
    pub fn finish(self) -> Self {
        Self {
            state: Some(StreamState::Done),
            ..self
        }
    }
}

/// Model "thinking" trace. Optional and provider-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StreamState>,
    /// Opaque provider payload (e.g. redacted-thinking signatures).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<Value>,
}

impl ReasoningPart {
    /// Opens a reasoning part that is still receiving deltas.
    pub fn streaming(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: Some(StreamState::Streaming),
            provider_metadata: None,
        }
    }

    /// True unless the part is still streaming.
    pub fn is_done(&self) -> bool {
        self.state.unwrap_or_default().is_done()
    }

    /// Returns a new part with `delta` appended. Rejects appends to a
    /// finalized part.
    pub fn append(&self, delta: &str) -> Result<Self, PalaverError> {
        let state = self
            .state
            .unwrap_or_default()
            .advance_to(StreamState::Streaming)?;
        let mut text = self.text.clone();
        text.push_str(delta);
        Ok(Self {
            text,
            state: Some(state),
            provider_metadata: self.provider_metadata.clone(),
        })
    }

    /// Finalizes the part. Idempotent.
    pub fn finish(self) -> Self {
        Self {
            state: Some(StreamState::Done),
            ..self
        }
    }
}

/// A generic tool invocation. The tool name lives in the wire tag
/// (`tool-<name>`), not in the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPart {
    /// Tool name, recovered from the tag on decode.
    #[serde(skip)]
    pub tool: String,
    pub tool_call_id: String,
    pub state: ToolState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl ToolPart {
    /// Opens a tool part whose input is still streaming.
    pub fn input_streaming(tool: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            tool_call_id: tool_call_id.into(),
            state: ToolState::InputStreaming,
            input: None,
            output: None,
            error_text: None,
        }
    }

    /// Attaches the complete input and advances to `input-available`.
    pub fn with_input(self, input: Value) -> Result<Self, PalaverError> {
        let state = self.state.advance_to(ToolState::InputAvailable)?;
        Ok(Self {
            input: Some(input),
            state,
            ..self
        })
    }

    /// Attaches the tool output and advances to the `output-available`
    /// terminal.
    pub fn with_output(self, output: Value) -> Result<Self, PalaverError> {
        let state = self.state.advance_to(ToolState::OutputAvailable)?;
        Ok(Self {
            output: Some(output),
            state,
            ..self
        })
    }

    /// Attaches an error description and advances to the `output-error`
    /// terminal.
    pub fn with_error(self, error_text: impl Into<String>) -> Result<Self, PalaverError> {
        let state = self.state.advance_to(ToolState::OutputError)?;
        Ok(Self {
            error_text: Some(error_text.into()),
            state,
            ..self
        })
    }
}

/// Input payload for the built-in search tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub query: String,
}

/// Output payload for the built-in search tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutput {
    /// Result entries; shape is provider-defined and carried opaquely.
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The built-in search tool: same state machine as [`ToolPart`], narrower
/// payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchToolPart {
    pub tool_call_id: String,
    pub state: ToolState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<SearchInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<SearchOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

/// A file attachment reference.
///
/// `id` and `storage_path` name a location in private storage. They are
/// internal identifiers and must never cross the public-share boundary; only
/// `url`, `media_type`, and `filename` may be shown to an untrusted reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub url: String,
    /// Internal attachment record id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Internal object-storage path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}

/// A source citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUrlPart {
    pub source_id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One discriminated unit of message content.
///
/// Serialized as a JSON object tagged by `type`. See the module docs for the
/// tag scheme and the permissive-decoding policy behind [`Part::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Final assistant/user text (`type: "text"`).
    Text(TextPart),
    /// Model reasoning trace (`type: "reasoning"`).
    Reasoning(ReasoningPart),
    /// Generic tool invocation (`type: "tool-<name>"`).
    Tool(ToolPart),
    /// Built-in search tool (`type: "tool-search"`).
    ToolSearch(SearchToolPart),
    /// File attachment (`type: "file"`).
    File(FilePart),
    /// Source citation (`type: "source-url"`).
    SourceUrl(SourceUrlPart),
    /// Step delimiter (`type: "step-start"`), marker only.
    StepStart,
    /// Unrecognized or malformed payload, preserved verbatim.
    Unknown(Value),
}

impl Part {
    /// Classifies a raw JSON value into a part. Never fails: anything that
    /// does not match a known tag shape is preserved as [`Part::Unknown`].
    pub fn from_value(value: Value) -> Part {
        let tag = match value.get("type").and_then(Value::as_str) {
            Some(tag) => tag.to_owned(),
            None => {
                debug!("part payload has no type tag, preserving verbatim");
                return Part::Unknown(value);
            }
        };

        match tag.as_str() {
            TEXT_TAG => parse_tagged(value, Part::Text),
            REASONING_TAG => parse_tagged(value, Part::Reasoning),
            SEARCH_TOOL_TAG => parse_tagged(value, Part::ToolSearch),
            FILE_TAG => parse_tagged(value, Part::File),
            SOURCE_URL_TAG => parse_tagged(value, Part::SourceUrl),
            STEP_START_TAG => Part::StepStart,
            other => match other.strip_prefix(TOOL_TAG_PREFIX) {
                Some(name) => {
                    let name = name.to_owned();
                    match serde_json::from_value::<ToolPart>(value.clone()) {
                        Ok(mut part) => {
                            part.tool = name;
                            Part::Tool(part)
                        }
                        Err(err) => {
                            debug!(tag = %other, %err, "tool part did not match the tool contract, preserving verbatim");
                            Part::Unknown(value)
                        }
                    }
                }
                None => {
                    debug!(tag = %other, "unrecognized part tag, preserving verbatim");
                    Part::Unknown(value)
                }
            },
        }
    }

    /// The wire `type` tag for this part, or `"unknown"` for an untagged
    /// unrecognized payload.
    pub fn tag(&self) -> String {
        match self {
            Part::Text(_) => TEXT_TAG.to_owned(),
            Part::Reasoning(_) => REASONING_TAG.to_owned(),
            Part::Tool(part) => format!("{TOOL_TAG_PREFIX}{}", part.tool),
            Part::ToolSearch(_) => SEARCH_TOOL_TAG.to_owned(),
            Part::File(_) => FILE_TAG.to_owned(),
            Part::SourceUrl(_) => SOURCE_URL_TAG.to_owned(),
            Part::StepStart => STEP_START_TAG.to_owned(),
            Part::Unknown(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_owned(),
        }
    }

    /// True iff this is a file part. The sole gate before accessing
    /// file-only fields.
    pub fn is_file(&self) -> bool {
        matches!(self, Part::File(_))
    }

    /// True iff this is a text part.
    pub fn is_text(&self) -> bool {
        matches!(self, Part::Text(_))
    }

    /// True iff this is a reasoning part.
    pub fn is_reasoning(&self) -> bool {
        matches!(self, Part::Reasoning(_))
    }

    /// True iff this is a tool part, generic or search.
    pub fn is_tool(&self) -> bool {
        matches!(self, Part::Tool(_) | Part::ToolSearch(_))
    }

    /// True iff this is a source citation.
    pub fn is_source_url(&self) -> bool {
        matches!(self, Part::SourceUrl(_))
    }

    /// True iff this is a step marker.
    pub fn is_step_start(&self) -> bool {
        matches!(self, Part::StepStart)
    }

    /// True iff this payload was preserved verbatim.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Part::Unknown(_))
    }

    /// Borrows the file fields, if this is a file part.
    pub fn as_file(&self) -> Option<&FilePart> {
        match self {
            Part::File(part) => Some(part),
            _ => None,
        }
    }

    /// Borrows the text fields, if this is a text part.
    pub fn as_text(&self) -> Option<&TextPart> {
        match self {
            Part::Text(part) => Some(part),
            _ => None,
        }
    }

    /// The tool call id, for either tool variant.
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Part::Tool(part) => Some(&part.tool_call_id),
            Part::ToolSearch(part) => Some(&part.tool_call_id),
            _ => None,
        }
    }
}

/// Decodes `value` as `T`, falling back to verbatim preservation when the
/// body does not match its declared tag.
fn parse_tagged<T: DeserializeOwned>(value: Value, wrap: impl FnOnce(T) -> Part) -> Part {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(part) => wrap(part),
        Err(err) => {
            debug!(%err, "part payload did not match its declared tag, preserving verbatim");
            Part::Unknown(value)
        }
    }
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Part::Text(part) => serialize_tagged(serializer, TEXT_TAG, part),
            Part::Reasoning(part) => serialize_tagged(serializer, REASONING_TAG, part),
            Part::Tool(part) => {
                serialize_tagged(serializer, &format!("{TOOL_TAG_PREFIX}{}", part.tool), part)
            }
            Part::ToolSearch(part) => serialize_tagged(serializer, SEARCH_TOOL_TAG, part),
            Part::File(part) => serialize_tagged(serializer, FILE_TAG, part),
            Part::SourceUrl(part) => serialize_tagged(serializer, SOURCE_URL_TAG, part),
            Part::StepStart => serialize_tagged(serializer, STEP_START_TAG, &Value::Object(serde_json::Map::new())),
            Part::Unknown(value) => value.serialize(serializer),
        }
    }
}

/// Serializes a part body as an object with the `type` tag injected first.
fn serialize_tagged<S: Serializer, T: Serialize>(
    serializer: S,
    tag: &str,
    body: &T,
) -> Result<S::Ok, S::Error> {
    let mut value = serde_json::to_value(body).map_err(S::Error::custom)?;
    let body_map = value
        .as_object_mut()
        .ok_or_else(|| S::Error::custom("part body must serialize to a JSON object"))?;
    let mut map = serde_json::Map::with_capacity(body_map.len() + 1);
    map.insert("type".to_owned(), Value::String(tag.to_owned()));
    map.extend(mem::take(body_map));
    map.serialize(serializer)
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Part::from_value(value))
    }
}
