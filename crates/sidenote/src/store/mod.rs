//! Persistence layer for sidenote.
//!
//! Two stores back the service: the append-only [`RecordLog`] holding one
//! JSON record per line, and the content-addressed [`UploadStore`] holding
//! attachment bytes. The log is the single source of truth; it is never
//! rewritten or compacted, and uploads are never garbage collected.

pub mod uploads;

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::Record;

pub use uploads::{UploadStats, UploadStore};

/// Append-only newline-delimited JSON record log.
///
/// Each record occupies exactly one line. Appends are serialized through a
/// mutex and issued as a single write on a handle opened in append mode, so
/// concurrent appends interleave at line granularity and a line is never
/// split mid-way.
#[derive(Debug)]
pub struct RecordLog {
    /// Path to the log file.
    path: PathBuf,
    /// Append-mode handle, held for the life of the store.
    file: Mutex<File>,
}

impl RecordLog {
    /// Open or create the log at the given path.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// log file cannot be opened in append mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening record log at {}", path.display());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::LogOpen {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Get the path to the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record as a single line.
    ///
    /// The serialized record contains no embedded newlines, and the line
    /// plus its terminator go out in one write, keeping the append atomic
    /// at line granularity.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn append(&self, record: &Record) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())
            .map_err(|source| Error::LogAppend {
                path: self.path.clone(),
                source,
            })?;

        debug!("Appended record for {}", record.href);
        Ok(())
    }

    /// Read every record in log order.
    ///
    /// Blank lines are skipped; a malformed line fails the whole read with
    /// the offending 1-based line number.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any line fails to
    /// parse as a record.
    pub fn read_all(&self) -> Result<Vec<Record>> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| Error::LogRead {
                path: self.path.clone(),
                source,
            })?;

        let mut records = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record =
                serde_json::from_str(line).map_err(|source| Error::CorruptRecord {
                    line: index + 1,
                    source,
                })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Gather log statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn stats(&self) -> Result<LogStats> {
        let records = self.read_all()?;

        let groups = records
            .iter()
            .map(|record| record.href.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut oldest_time: Option<f64> = None;
        let mut newest_time: Option<f64> = None;
        for time in records.iter().map(Record::time_secs) {
            oldest_time = Some(oldest_time.map_or(time, |oldest| oldest.min(time)));
            newest_time = Some(newest_time.map_or(time, |newest| newest.max(time)));
        }

        let log_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(LogStats {
            total_records: records.len(),
            groups,
            oldest_time,
            newest_time,
            log_size_bytes,
        })
    }
}

/// Statistics about the record log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogStats {
    /// Total number of records in the log.
    pub total_records: usize,
    /// Number of distinct `href` groups.
    pub groups: usize,
    /// Smallest record time, if the log is non-empty.
    pub oldest_time: Option<f64>,
    /// Largest record time, if the log is non-empty.
    pub newest_time: Option<f64>,
    /// Size of the log file in bytes.
    pub log_size_bytes: u64,
}
