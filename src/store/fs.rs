//! Filesystem-backed lease store.
//!
//! Each record is one file in a private directory, named by a deterministic,
//! filesystem-safe encoding of its key. Raw keys are unsafe as file names
//! (file-lock keys contain path separators), so keys are percent-encoded;
//! keys that are already safe, like singleton kind names, pass through
//! unchanged.

use super::LeaseStore;
use crate::error::{Result, ShoalError};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension for stored lease records.
const LEASE_EXTENSION: &str = "lease";

/// Characters escaped in lease file names. Everything outside
/// `[A-Za-z0-9._-]` is percent-encoded.
const KEY_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'_').remove(b'-');

/// Lease store keeping one JSON file per key in a dedicated directory.
#[derive(Debug)]
pub struct FsLeaseStore {
    dir: PathBuf,
}

impl FsLeaseStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir).map_err(|e| {
            ShoalError::Storage(format!(
                "failed to create lease directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        Ok(Self { dir })
    }

    /// The directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        let encoded = utf8_percent_encode(key, KEY_ESCAPES).to_string();
        self.dir.join(format!("{}.{}", encoded, LEASE_EXTENSION))
    }
}

impl LeaseStore for FsLeaseStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.record_path(key);

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShoalError::Storage(format!(
                "failed to read lease record '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.record_path(key);

        fs::write(&path, value).map_err(|e| {
            ShoalError::Storage(format!(
                "failed to write lease record '{}': {}",
                path.display(),
                e
            ))
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.record_path(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShoalError::Storage(format!(
                "failed to delete lease record '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn list_all(&self) -> Result<Vec<(String, String)>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            ShoalError::Storage(format!(
                "failed to read lease directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut records = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| {
                ShoalError::Storage(format!("failed to read lease directory entry: {}", e))
            })?;

            let path = entry.path();

            // Skip anything that is not a lease record.
            if path.extension().and_then(|e| e.to_str()) != Some(LEASE_EXTENSION) {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let key = percent_decode_str(stem).decode_utf8_lossy().to_string();

            let value = fs::read_to_string(&path).map_err(|e| {
                ShoalError::Storage(format!(
                    "failed to read lease record '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            records.push((key, value));
        }

        // Sort by key for consistent iteration order.
        records.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(records)
    }
}
