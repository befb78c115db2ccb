use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use stratum_schema::{Digest, DIGEST_ALGORITHM};
use tempfile::NamedTempFile;

/// Current store format version. Incremented on incompatible layout changes.
pub const STORE_FORMAT_VERSION: u32 = 1;
const VERSION_FILE: &str = "version";

/// Directory layout for the Stratum blob store.
///
/// Blobs live at `store/blobs/<algorithm>/<hex>`; partial writes are staged
/// in `store/staging` on the same filesystem so that publishing a blob is a
/// single rename.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreVersion {
    format_version: u32,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn blobs_dir(&self) -> PathBuf {
        self.root.join("store").join("blobs").join(DIGEST_ALGORITHM)
    }

    #[inline]
    pub fn blob_path(&self, digest: &Digest) -> PathBuf {
        self.root
            .join("store")
            .join("blobs")
            .join(digest.algorithm())
            .join(digest.hex())
    }

    #[inline]
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("store").join("staging")
    }

    #[inline]
    fn version_file(&self) -> PathBuf {
        self.root.join("store").join(VERSION_FILE)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.blobs_dir())?;
        fs::create_dir_all(self.staging_dir())?;

        let version_path = self.version_file();
        if version_path.exists() {
            return self.verify_version();
        }

        let ver = StoreVersion {
            format_version: STORE_FORMAT_VERSION,
        };
        let content = serde_json::to_string_pretty(&ver)?;
        let store_dir = self.root.join("store");
        let mut tmp = NamedTempFile::new_in(&store_dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&version_path)
            .map_err(|e| StoreError::Io(e.error))?;
        crate::fsync_dir(&store_dir)?;
        Ok(())
    }

    pub fn verify_version(&self) -> Result<(), StoreError> {
        let content = fs::read_to_string(self.version_file())?;
        let ver: StoreVersion = serde_json::from_str(&content)?;

        if ver.format_version != STORE_FORMAT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                found: ver.format_version,
            });
        }
        Ok(())
    }
}
