//! Storage backends
//!
//! This module defines the BlobStore trait and the filesystem implementation.

pub mod file;
pub mod name;

use std::io::{self, Read, Write};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot create blob {name}: {source}")]
    Create { name: String, source: io::Error },

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("cannot remove blob {name}: {source}")]
    Remove { name: String, source: io::Error },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob storage trait - maps sanitized names to byte blobs.
///
/// Implementations hold no per-session state; one instance is shared by
/// every connection.
pub trait BlobStore: Send + Sync {
    /// Handle returned for writing a blob
    type Writer: Write;

    /// Handle returned for reading a blob
    type Reader: Read;

    /// Create the blob, truncating any existing content.
    fn create_or_truncate(&self, name: &BlobName) -> StorageResult<Self::Writer>;

    /// Open the blob for reading along with its current length in bytes.
    fn open_for_read(&self, name: &BlobName) -> StorageResult<(Self::Reader, u64)>;

    /// Delete the blob.
    fn remove(&self, name: &BlobName) -> StorageResult<()>;

    /// Complete a write started with `create_or_truncate`.
    fn finish(&self, mut writer: Self::Writer) -> StorageResult<()> {
        writer.flush()?;
        Ok(())
    }
}

pub use file::FileStore;
pub use name::BlobName;
