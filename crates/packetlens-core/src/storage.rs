//! Raw-upload persistence ahead of parsing.
//!
//! The uploaded bytes are stored first; only once that succeeds is the
//! capture parsed, and the storage key is attached to the response as
//! `fileName`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::analysis::parse_capture_with;
use crate::{CaptureResult, ParseError, ParseOptions};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid upload name '{name}'")]
    InvalidName { name: String },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StorageError),
    #[error("parse failure: {0}")]
    Parse(#[from] ParseError),
}

/// Object storage for raw capture uploads.
pub trait UploadStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Stores each upload as a file named by its key under `root`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl UploadStore for DirectoryStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(key);
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "upload stored");
        Ok(())
    }
}

/// Key under which an upload is stored: `<epoch millis>_<file name>`.
///
/// # Errors
/// `InvalidName` for empty names and names containing path separators or
/// parent references.
///
/// # Examples
/// ```
/// use packetlens_core::storage_key;
///
/// assert_eq!(storage_key("trace.pcap", 1_700_000_000_000).unwrap(), "1700000000000_trace.pcap");
/// assert!(storage_key("../trace.pcap", 0).is_err());
/// ```
pub fn storage_key(file_name: &str, now_millis: i64) -> Result<String, StorageError> {
    let invalid = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidName {
            name: file_name.to_string(),
        });
    }
    Ok(format!("{now_millis}_{file_name}"))
}

/// Parse result plus the storage key of the raw upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(flatten)]
    pub result: CaptureResult,
    pub file_name: String,
}

/// Store `bytes` under a fresh key, then parse them.
///
/// # Errors
/// `StorageFailure` if the store rejects the upload (nothing is parsed), or
/// `Parse` if the stored bytes are not a recognizable capture.
pub fn ingest_upload<S: UploadStore>(
    store: &S,
    file_name: &str,
    bytes: &[u8],
    options: &ParseOptions,
) -> Result<UploadResponse, IngestError> {
    let now_millis = millis_from_nanos(OffsetDateTime::now_utc().unix_timestamp_nanos());
    let key = storage_key(file_name, now_millis)?;
    info!(file_name, size = bytes.len(), "processing upload");
    store.put(&key, bytes)?;

    let result = parse_capture_with(bytes, options)?;
    info!(
        key = key.as_str(),
        packets = result.stats.total_packets,
        "upload parsed"
    );
    Ok(UploadResponse {
        result,
        file_name: key,
    })
}

/// Epoch nanoseconds to milliseconds, saturating at the `i64` range.
fn millis_from_nanos(nanos: i128) -> i64 {
    let millis = nanos / 1_000_000;
    i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
}
