//! Filesystem storage backend
//!
//! Stores every blob as a regular file directly under one root directory.

use super::{BlobName, BlobStore, StorageError, StorageResult};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Flat directory of blobs
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    sync_writes: bool,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            sync_writes: false,
        })
    }

    /// Sync each blob to disk before a write is reported complete
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, name: &BlobName) -> Option<PathBuf> {
        name.is_valid().then(|| self.root.join(name.as_str()))
    }
}

impl BlobStore for FileStore {
    type Writer = File;
    type Reader = File;

    fn create_or_truncate(&self, name: &BlobName) -> StorageResult<File> {
        let path = self.blob_path(name).ok_or_else(|| StorageError::Create {
            name: name.to_string(),
            source: invalid_name(name),
        })?;

        File::create(&path).map_err(|source| StorageError::Create {
            name: name.to_string(),
            source,
        })
    }

    fn open_for_read(&self, name: &BlobName) -> StorageResult<(File, u64)> {
        let path = self
            .blob_path(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        Ok((file, metadata.len()))
    }

    fn remove(&self, name: &BlobName) -> StorageResult<()> {
        let path = self.blob_path(name).ok_or_else(|| StorageError::Remove {
            name: name.to_string(),
            source: invalid_name(name),
        })?;

        fs::remove_file(&path).map_err(|source| StorageError::Remove {
            name: name.to_string(),
            source,
        })?;
        log::debug!("Deleted blob: {}", name);
        Ok(())
    }

    fn finish(&self, mut writer: File) -> StorageResult<()> {
        writer.flush()?;
        if self.sync_writes {
            writer.sync_all()?;
        }
        Ok(())
    }
}

fn invalid_name(name: &BlobName) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("unusable blob name {:?}", name.as_str()),
    )
}
