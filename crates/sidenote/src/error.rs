//! Error types for sidenote.
//!
//! This module defines all error types used throughout the sidenote crate,
//! along with the mapping from errors to HTTP responses.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// The main error type for sidenote operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or create the record log.
    #[error("failed to open record log at {path}: {source}")]
    LogOpen {
        /// Path to the log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to append a record to the log.
    #[error("failed to append to record log at {path}: {source}")]
    LogAppend {
        /// Path to the log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the record log.
    #[error("failed to read record log at {path}: {source}")]
    LogRead {
        /// Path to the log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A log line could not be parsed as a record.
    ///
    /// One corrupt line fails the whole read; the log has no recovery path
    /// short of manual repair.
    #[error("corrupt record on log line {line}: {source}")]
    CorruptRecord {
        /// 1-based line number of the offending line.
        line: usize,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write an uploaded file.
    #[error("failed to write upload {name}: {source}")]
    UploadWrite {
        /// Content-addressed name of the upload.
        name: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Submission Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An attachment's base64 payload could not be decoded.
    #[error("invalid base64 in attachment data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// An attachment was malformed (e.g. missing its data payload).
    #[error("invalid attachment: {message}")]
    Attachment {
        /// Description of what was wrong with the attachment.
        message: String,
    },

    // === Auth Errors ===
    /// A write request failed the shared-key check.
    #[error("unauthorized")]
    Unauthorized,

    // === Render Errors ===
    /// The feed template failed to compile or render.
    #[error("feed template error: {0}")]
    Template(#[from] Box<upon::Error>),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for sidenote operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a new attachment error.
    #[must_use]
    pub fn attachment(message: impl Into<String>) -> Self {
        Self::Attachment {
            message: message.into(),
        }
    }

    /// Check if this error is an authentication rejection.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Map errors to HTTP responses.
///
/// Auth rejections answer `401 unauthorized`. Everything else — malformed
/// JSON, bad base64, filesystem failures, a corrupt log line — surfaces as
/// an opaque `500`; the service makes no attempt at per-cause status codes
/// and never retries.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized").into_response(),
            err => {
                tracing::error!("request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}
