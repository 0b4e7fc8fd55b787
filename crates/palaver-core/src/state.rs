// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Forward-only streaming state machines for message parts.
//!
//! Text and reasoning parts carry a [`StreamState`]; tool parts carry a
//! [`ToolState`]. Both only ever advance through their defined sequence --
//! once a part is finalized it is immutable historical record, so a
//! regression is a bug in the caller and is rejected with
//! [`PalaverError::InvalidTransition`]. Transitions return new values rather
//! than mutating in place; the streaming layer holds the current reference.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::PalaverError;

/// Streaming state for text and reasoning parts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StreamState {
    /// Content is still being appended by the provider stream.
    Streaming,
    /// The part is finalized and immutable.
    Done,
}

impl Default for StreamState {
    /// A part deserialized without a state is treated as finalized --
    /// persisted records predate streaming state tracking.
    fn default() -> Self {
        StreamState::Done
    }
}

impl StreamState {
    /// Returns the target state if the move is a no-op or a forward advance.
    pub fn advance_to(self, next: StreamState) -> Result<StreamState, PalaverError> {
        if next >= self {
            Ok(next)
        } else {
            Err(PalaverError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// True once the part can no longer change.
    pub fn is_done(self) -> bool {
        self == StreamState::Done
    }
}

/// Execution state for tool parts.
///
/// Sequence: `input-streaming -> input-available -> output-available |
/// output-error`. The two output states are alternative terminals; neither
/// can transition to the other. Forward skips are permitted (a tool that
/// fails before its input finishes streaming goes straight to
/// `output-error`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ToolState {
    /// Tool input JSON is still being streamed.
    InputStreaming,
    /// Input is complete; the tool has not produced output yet.
    InputAvailable,
    /// The tool completed and its output is attached.
    OutputAvailable,
    /// The tool failed and an error description is attached.
    OutputError,
}

impl ToolState {
    /// True for the two terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(self, ToolState::OutputAvailable | ToolState::OutputError)
    }

    /// Whether moving from `self` to `next` respects the forward-only order.
    ///
    /// Same-state moves are permitted no-ops. Terminals accept no successor
    /// other than themselves.
    pub fn can_advance_to(self, next: ToolState) -> bool {
        use ToolState::{InputAvailable, InputStreaming};
        match (self, next) {
            (a, b) if a == b => true,
            (InputStreaming, _) => true,
            (InputAvailable, InputStreaming) => false,
            (InputAvailable, _) => true,
            // Terminal states never change.
            _ => false,
        }
    }

    /// Returns the target state or rejects a backwards/terminal-crossing move.
    pub fn advance_to(self, next: ToolState) -> Result<ToolState, PalaverError> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(PalaverError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}
