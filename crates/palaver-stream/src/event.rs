// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed incremental events from a provider response stream.

use palaver_core::{FilePart, SourceUrlPart};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One incremental event in a streaming model response.
///
/// Tool events address their part by `toolCallId`; text and reasoning
/// events implicitly address the trailing open part of their kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StreamEvent {
    /// Delimits a reasoning/tool execution step.
    StepStart,
    /// Appends text to the open text part, opening one if needed.
    TextDelta { text: String },
    /// Finalizes the open text part.
    TextEnd,
    /// Appends to the open reasoning part, opening one if needed.
    ReasoningDelta { text: String },
    /// Finalizes the open reasoning part.
    ReasoningEnd,
    /// A tool call begins; its input is still streaming.
    ToolInputStart { tool: String, tool_call_id: String },
    /// The tool call's complete input.
    ToolInputAvailable { tool_call_id: String, input: Value },
    /// The tool completed with output.
    ToolOutputAvailable { tool_call_id: String, output: Value },
    /// The tool failed.
    ToolOutputError {
        tool_call_id: String,
        error_text: String,
    },
    /// A finished file attachment produced mid-stream.
    File {
        #[serde(flatten)]
        part: FilePart,
    },
    /// A source citation produced mid-stream.
    SourceUrl {
        #[serde(flatten)]
        part: SourceUrlPart,
    },
}
