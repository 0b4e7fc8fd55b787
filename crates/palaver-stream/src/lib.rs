// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental assembly of message parts from provider stream events.
//!
//! While a model response streams, parts are created and advanced one event
//! at a time: a reasoning trace opens, deltas append, the trace finalizes, a
//! tool call appears, its output lands, final text streams in. The
//! [`MessageAssembler`] folds that event sequence into an ordered part list,
//! producing a new part value for every transition so the forward-only state
//! invariant is enforced by the state machines themselves rather than by
//! caller discipline.

pub mod assemble;
pub mod event;

pub use assemble::MessageAssembler;
pub use event::StreamEvent;
