//! Cache directory access
//!
//! Every filesystem call against the cache directory goes through
//! [`CacheStore`], which is the only place `std::io::ErrorKind` is inspected.
//!
//! Writes stage their bytes in a `.<code>.*.tmp` file next to the entry. If
//! the process dies before the rename, that file stays behind; it never
//! matches `<code>.jpg`, so reads and deletes ignore it.

use hyper::body::Bytes;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use super::code::ResourceCode;

/// File extension of every cache entry
const ENTRY_EXTENSION: &str = "jpg";

/// Classified failure of a cache directory operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    NotFound,
    PermissionDenied,
    Io,
    Other,
}

impl From<io::ErrorKind> for StoreErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::Other => Self::Other,
            _ => Self::Io,
        }
    }
}

#[derive(Debug, Error)]
#[error("cache {op} failed for {}: {source}", .path.display())]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub op: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl StoreError {
    fn new(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self {
            kind: source.kind().into(),
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == StoreErrorKind::NotFound
    }
}

/// Flat directory of `<code>.jpg` files
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn entry_path(&self, code: ResourceCode) -> PathBuf {
        self.dir.join(format!("{code}.{ENTRY_EXTENSION}"))
    }

    /// Read the whole entry for `code`
    pub async fn read(&self, code: ResourceCode) -> Result<Bytes, StoreError> {
        let path = self.entry_path(code);
        fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| StoreError::new("read", &path, e))
    }

    /// Replace the entry for `code` with `data`
    ///
    /// The bytes are written to a temporary file inside the cache directory
    /// and renamed over the entry, so concurrent writers never interleave.
    pub async fn write(&self, code: ResourceCode, data: Bytes) -> Result<(), StoreError> {
        let dir = self.dir.clone();
        let path = self.entry_path(code);
        let prefix = format!(".{code}.");

        let task_path = path.clone();
        let result = tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut tmp = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".tmp")
                .tempfile_in(&dir)?;
            tmp.write_all(&data)?;
            tmp.flush()?;
            tmp.persist(&task_path).map_err(|e| e.error)?;
            Ok(())
        })
        .await;

        match result {
            Ok(res) => res.map_err(|e| StoreError::new("write", &path, e)),
            Err(join_err) => Err(StoreError::new(
                "write",
                &path,
                io::Error::other(join_err.to_string()),
            )),
        }
    }

    /// Remove the entry for `code`
    pub async fn remove(&self, code: ResourceCode) -> Result<(), StoreError> {
        let path = self.entry_path(code);
        fs::remove_file(&path)
            .await
            .map_err(|e| StoreError::new("remove", &path, e))
    }
}
