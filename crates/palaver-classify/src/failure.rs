// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from an arbitrary caught failure value to display text.
//!
//! A *recognized* failure is a JSON object carrying a string `message`
//! field. Everything else (null, plain strings, numbers, arrays, objects
//! without a message) maps to a fixed default -- classification is total and
//! never raises. The insufficient-credits check is a case-insensitive
//! substring match; the provider exposes no structured code for it, so the
//! pattern is isolated in one constant where a structured code could replace
//! it later.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;

/// Shown when the caught value is not a recognized failure object.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Shown when a recognized failure carries an empty message.
/// Whitespace-only messages count as empty.
pub const EMPTY_MESSAGE_FALLBACK: &str = "Failed to send message";

/// The billing-failure phrase providers emit today.
static INSUFFICIENT_CREDITS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)insufficient credits").unwrap());

/// How a caught failure was recognized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    /// Not a structured failure object; the default message applies.
    Unrecognized,
    /// A structured failure with no specific pattern match.
    Generic,
    /// The message matched the insufficient-credits pattern; callers may
    /// render a billing affordance instead of a plain toast.
    InsufficientCredits,
}

/// A classified failure: safe display text plus the recognized condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedFailure {
    pub message: String,
    pub kind: FailureKind,
}

impl ClassifiedFailure {
    /// True iff this is the recognized billing failure.
    pub fn is_insufficient_credits(&self) -> bool {
        self.kind == FailureKind::InsufficientCredits
    }
}

/// Classifies an arbitrary caught failure value.
///
/// Total and deterministic: every JSON value maps to a non-empty display
/// message and a [`FailureKind`].
pub fn classify(raw: &Value) -> ClassifiedFailure {
    let message = raw
        .as_object()
        .and_then(|obj| obj.get("message"))
        .and_then(Value::as_str);

    match message {
        None => {
            debug!("caught value is not a recognized failure object");
            ClassifiedFailure {
                message: DEFAULT_ERROR_MESSAGE.to_owned(),
                kind: FailureKind::Unrecognized,
            }
        }
        Some(text) if text.trim().is_empty() => ClassifiedFailure {
            message: EMPTY_MESSAGE_FALLBACK.to_owned(),
            kind: FailureKind::Generic,
        },
        Some(text) if INSUFFICIENT_CREDITS_PATTERN.is_match(text) => ClassifiedFailure {
            message: text.to_owned(),
            kind: FailureKind::InsufficientCredits,
        },
        Some(text) => ClassifiedFailure {
            message: text.to_owned(),
            kind: FailureKind::Generic,
        },
    }
}

/// The user-facing display string for a caught failure. Always non-empty.
pub fn display_message(raw: &Value) -> String {
    classify(raw).message
}

/// True iff the caught failure is the recognized billing failure.
pub fn is_insufficient_credits(raw: &Value) -> bool {
    classify(raw).is_insufficient_credits()
}
