// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider failure classification.
//!
//! Upstream model-provider failures arrive as untyped JSON payloads with no
//! stable error codes. This crate is the single place that turns such a
//! caught value into a safe user-facing string and a recognized-condition
//! signal, so the matching rules live in one spot instead of being scattered
//! through call sites.

pub mod failure;

pub use failure::{
    classify, display_message, is_insufficient_credits, ClassifiedFailure, FailureKind,
    DEFAULT_ERROR_MESSAGE, EMPTY_MESSAGE_FALLBACK,
};
