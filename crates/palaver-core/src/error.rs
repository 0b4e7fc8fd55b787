// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Palaver message pipeline.

use thiserror::Error;

/// The primary error type used across the Palaver crates.
#[derive(Debug, Error)]
pub enum PalaverError {
    /// A streaming state was asked to move backwards or between terminals.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// A stream event referenced a tool call id with no matching part.
    #[error("unknown tool call: {tool_call_id}")]
    UnknownToolCall { tool_call_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
