// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message redaction for public share links.
//!
//! A share link exposes a thread's messages to unauthenticated readers. File
//! parts carry internal storage identifiers that name private objects; this
//! crate rewrites message sequences so those identifiers never cross the
//! share boundary.

pub mod sanitize;

pub use sanitize::{sanitize_messages, SharePolicy};
