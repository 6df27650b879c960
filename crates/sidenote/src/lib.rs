//! `sidenote` - a self-hosted capture server for web annotations
//!
//! This library provides the core functionality for receiving JSON
//! submissions over HTTP, persisting them to an append-only record log with
//! content-addressed file uploads, and rendering the accumulated records as
//! an HTML feed grouped by source page.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod record;
pub mod server;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use feed::FeedRenderer;
pub use logging::init_logging;
pub use record::{Attachment, Content, Record};
pub use store::{RecordLog, UploadStore};
