//! Content-addressed blob storage for Stratum.
//!
//! This crate provides the storage seam the manifest builder consumes: the
//! `BlobStore` trait with its `stat`/`put`/`get` contract, the `BlobStat`
//! result that separates "not stored" from real failures, a durable
//! filesystem implementation (`FsBlobStore`) laid out by `StoreLayout`, an
//! in-memory implementation for embedding and tests, integrity verification,
//! and the cancellation `Context` passed to every store call.

pub mod blob;
pub mod context;
pub mod fs;
pub mod integrity;
pub mod layout;
pub mod memory;

pub use blob::{BlobStat, BlobStore};
pub use context::{Context, ContextError};
pub use fs::FsBlobStore;
pub use integrity::{verify_store_integrity, IntegrityFailure, IntegrityReport};
pub use layout::{StoreLayout, STORE_FORMAT_VERSION};
pub use memory::MemoryBlobStore;

use std::path::Path;
use thiserror::Error;

/// Fsync a directory so that a preceding `rename()` into it is durable.
///
/// POSIX does not guarantee rename durability without syncing the parent.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("integrity check failed for blob '{digest}': expected {expected}, got {actual}")]
    IntegrityFailure {
        digest: String,
        expected: String,
        actual: String,
    },
    #[error("blob not found: {0}")]
    BlobNotFound(String),
    #[error("lock acquisition failed: {0}")]
    LockFailed(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("schema error: {0}")]
    Schema(#[from] stratum_schema::SchemaError),
    #[error("store call aborted: {0}")]
    Context(#[from] ContextError),
}
