use crate::blob::{BlobStat, BlobStore};
use crate::context::Context;
use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use stratum_schema::{Descriptor, Digest, DIGEST_ALGORITHM, MEDIA_TYPE_OCTET_STREAM};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Durable blob store on the local filesystem.
///
/// Blobs are files named by their digest. Writes are staged in a temp file,
/// synced, and renamed into place, so two writers racing on the same content
/// leave exactly one complete copy. Reads verify integrity by rehashing.
pub struct FsBlobStore {
    layout: StoreLayout,
}

impl FsBlobStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    /// Initialize the layout under `root` and open a store on it.
    pub fn open(root: impl Into<std::path::PathBuf>) -> Result<Self, StoreError> {
        let layout = StoreLayout::new(root);
        layout.initialize()?;
        Ok(Self::new(layout))
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn exists(&self, digest: &Digest) -> bool {
        self.layout.blob_path(digest).exists()
    }

    /// All stored digests, sorted. Files whose names are not valid digests
    /// are skipped.
    pub fn list(&self) -> Result<Vec<Digest>, StoreError> {
        let dir = self.layout.blobs_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut digests = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match Digest::parse(&format!("{DIGEST_ALGORITHM}:{name}")) {
                Ok(d) => digests.push(d),
                Err(_) => warn!("ignoring stray file in blob store: {name}"),
            }
        }
        digests.sort();
        Ok(digests)
    }
}

impl BlobStore for FsBlobStore {
    fn stat(&self, ctx: &Context, digest: &Digest) -> Result<BlobStat, StoreError> {
        ctx.check()?;
        match fs::metadata(self.layout.blob_path(digest)) {
            Ok(meta) => Ok(BlobStat::Found(Descriptor::new(
                MEDIA_TYPE_OCTET_STREAM,
                meta.len(),
                digest.clone(),
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BlobStat::Unknown),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, ctx: &Context, media_type: &str, data: &[u8]) -> Result<Descriptor, StoreError> {
        ctx.check()?;
        let digest = Digest::from_bytes(data);
        let dest = self.layout.blob_path(&digest);

        if dest.exists() {
            debug!("blob {digest} already stored, skipping write");
        } else {
            let mut tmp = NamedTempFile::new_in(self.layout.staging_dir())?;
            tmp.write_all(data)?;
            tmp.as_file().sync_all()?;

            // Dropping the temp file discards the staged bytes.
            ctx.check()?;

            let dir = self.layout.blobs_dir();
            tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
            fsync_dir(&dir)?;
            debug!("stored {media_type} blob {digest} ({} bytes)", data.len());
        }

        Ok(Descriptor::new(
            MEDIA_TYPE_OCTET_STREAM,
            data.len() as u64,
            digest,
        ))
    }

    fn get(&self, ctx: &Context, digest: &Digest) -> Result<Vec<u8>, StoreError> {
        ctx.check()?;
        let path = self.layout.blob_path(digest);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::BlobNotFound(digest.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let actual = Digest::from_bytes(&data);
        if actual != *digest {
            return Err(StoreError::IntegrityFailure {
                digest: digest.to_string(),
                expected: digest.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(data)
    }
}
