//! Core record types for sidenote.
//!
//! This module defines the typed shape of a logged submission. A record is
//! either an HTML clipping or a file attachment, never both; the two forms
//! are modeled as a tagged variant rather than an untyped map so that shape
//! errors surface at parse time.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A single logged submission.
///
/// Records are immutable once appended: there is no update or delete path.
/// The `time` field keeps the exact JSON number the client sent (integer or
/// float) so a record serializes back to the same value it was submitted
/// with; ordering uses its `f64` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// URL of the source page; the feed's grouping key.
    pub href: String,

    /// Display title of the source page.
    pub title: String,

    /// Client-supplied timestamp used for feed ordering.
    pub time: Number,

    /// Free-text labels, zero or more.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Annotation text accompanying the capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// The captured content: an attached file or an HTML fragment.
    #[serde(flatten)]
    pub content: Content,
}

/// The captured content of a [`Record`].
///
/// The variants are mutually exclusive in rendering: a file record shows an
/// image, an HTML record embeds its fragment verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// An attached file, displayed as an image in the feed.
    File {
        /// The attachment descriptor.
        file: Attachment,
    },
    /// A pre-rendered HTML fragment, embedded verbatim in the feed.
    Html {
        /// The raw fragment. Not sanitized: content author and feed reader
        /// are assumed to be the same person.
        html: String,
    },
}

/// A file carried by a submission.
///
/// On the wire an attachment arrives with a base64 `data` payload. Once the
/// bytes are stored, `data` is removed and `name` holds the
/// content-addressed filename; `src` and `type` pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Base64-encoded payload; present on submission, removed once stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Content-addressed filename, `<sha1-hex>.<ext>`; absent until stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// MIME type of the payload, e.g. `image/png`.
    #[serde(rename = "type")]
    pub content_type: String,

    /// Display URL used by the feed's image tag.
    pub src: String,
}

impl Attachment {
    /// File extension derived from the MIME type: everything after the last
    /// `/`, or the whole string when none is present (`image/png` → `png`).
    #[must_use]
    pub fn extension(&self) -> &str {
        self.content_type
            .rsplit('/')
            .next()
            .unwrap_or(&self.content_type)
    }
}

impl Record {
    /// The record's time as an `f64`, for ordering.
    ///
    /// Numbers outside the `f64` range sort first; JSON numbers are never
    /// NaN, so the ordering is total in practice.
    #[must_use]
    pub fn time_secs(&self) -> f64 {
        self.time.as_f64().unwrap_or(f64::NEG_INFINITY)
    }
}
