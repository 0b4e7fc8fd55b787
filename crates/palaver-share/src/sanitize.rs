// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Share-boundary sanitization.
//!
//! With attachments disabled, every file part is rewritten to its public
//! projection (`type`, `url`, `mediaType`, `filename` when present); the
//! internal `id` and `storagePath` are dropped. Everything else passes
//! through untouched, including payloads the part model did not recognize --
//! upstream provider schemas drift, and the redaction layer must not be the
//! thing that breaks when they do. Sanitization is total: it never fails and
//! never mutates its input.

use palaver_core::{FilePart, Message, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scope of a public share: whether file attachments are exposed.
///
/// The trust boundary is this explicit toggle, not the part type. A share
/// with attachments enabled is trusted to receive them, internal fields
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePolicy {
    pub show_attachments: bool,
}

/// Rewrites a message sequence for exposure through a public share link.
///
/// With `show_attachments` enabled the input is returned unchanged. With it
/// disabled the result has the same length and order, every message with an
/// empty part sequence passes through unchanged, and within each remaining
/// message only file parts are rewritten.
pub fn sanitize_messages(messages: Vec<Message>, policy: SharePolicy) -> Vec<Message> {
    if policy.show_attachments {
        return messages;
    }
    messages.into_iter().map(sanitize_message).collect()
}

fn sanitize_message(message: Message) -> Message {
    if message.parts.is_empty() {
        return message;
    }
    let parts = message.parts.into_iter().map(sanitize_part).collect();
    Message { parts, ..message }
}

fn sanitize_part(part: Part) -> Part {
    match part {
        Part::File(file) => Part::File(public_projection(file)),
        Part::Unknown(value) => {
            // Permissive passthrough; logged so schema drift stays observable.
            debug!(
                tag = value.get("type").and_then(|t| t.as_str()).unwrap_or("unknown"),
                "unrecognized part shape crossing share boundary verbatim"
            );
            Part::Unknown(value)
        }
        other => other,
    }
}

/// The minimal file projection a public consumer may see.
fn public_projection(file: FilePart) -> FilePart {
    FilePart {
        media_type: file.media_type,
        filename: file.filename,
        url: file.url,
        id: None,
        storage_path: None,
    }
}
