//! Submission processing.
//!
//! A submission is a single JSON object in the record shape. When it
//! carries a file, the base64 payload is decoded, written to the upload
//! store under its content-addressed name, and the logged record keeps the
//! stored name in place of the raw data. The record then goes to the log
//! as one line.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{Content, Record};

use super::AppState;

/// `POST` — validate the body, store any attachment, append to the log.
///
/// Failures here (malformed JSON, bad base64, a missing data payload,
/// filesystem trouble) all surface as the generic server error from
/// [`Error`]'s response mapping; there is no partial-failure recovery.
pub(super) async fn submit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Html<&'static str>> {
    let mut record: Record = serde_json::from_slice(&body)?;

    if let Content::File { file } = &mut record.content {
        let data = file
            .data
            .take()
            .ok_or_else(|| Error::attachment("file submissions must carry base64 data"))?;
        let bytes = BASE64.decode(data.as_bytes())?;
        let name = state.uploads.save(&bytes, file.extension())?;
        debug!("Attachment for {} stored as {}", record.href, name);
        file.name = Some(name);
    }

    state.log.append(&record)?;
    Ok(Html("ok"))
}
