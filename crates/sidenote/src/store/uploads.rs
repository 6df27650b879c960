//! Content-addressed upload storage.
//!
//! Uploaded attachment bytes live in a flat directory, named by the hex
//! SHA-1 of their content plus an extension derived from the submitted MIME
//! type. Identical content always lands on the same name, so re-uploading
//! the same bytes overwrites in place instead of growing the store. Files
//! are never deleted by the service.

use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::{Error, Result};

/// Flat directory of content-addressed uploaded files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    /// The directory holding the files.
    dir: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }

        Ok(Self { dir })
    }

    /// Get the directory the store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex-encoded SHA-1 of the given bytes.
    #[must_use]
    pub fn content_hash(bytes: &[u8]) -> String {
        let mut hasher = Sha1::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    /// Save bytes under their content-addressed name, overwriting any
    /// existing file with the same content. Returns the stored filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let name = format!("{}.{}", Self::content_hash(bytes), extension);
        let path = self.dir.join(&name);

        std::fs::write(&path, bytes).map_err(|source| Error::UploadWrite {
            name: name.clone(),
            source,
        })?;

        debug!("Stored upload {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    /// Count stored files and their total size.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn stats(&self) -> Result<UploadStats> {
        let mut files = 0;
        let mut total_bytes = 0;

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files += 1;
                total_bytes += entry.metadata()?.len();
            }
        }

        Ok(UploadStats { files, total_bytes })
    }
}

/// Statistics about the upload store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Number of stored files.
    pub files: usize,
    /// Combined size of the stored files in bytes.
    pub total_bytes: u64,
}
