use crate::blob::{BlobStat, BlobStore};
use crate::context::Context;
use crate::StoreError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use stratum_schema::{Descriptor, Digest, MEDIA_TYPE_OCTET_STREAM};

/// Blob store held entirely in memory. Same contract as the filesystem
/// store, without durability.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<Digest, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> Result<MutexGuard<'_, BTreeMap<Digest, Vec<u8>>>, StoreError> {
        self.blobs
            .lock()
            .map_err(|e| StoreError::LockFailed(format!("mutex poisoned: {e}")))
    }

    pub fn contains(&self, digest: &Digest) -> Result<bool, StoreError> {
        Ok(self.blobs()?.contains_key(digest))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.blobs()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.blobs()?.is_empty())
    }
}

impl BlobStore for MemoryBlobStore {
    fn stat(&self, ctx: &Context, digest: &Digest) -> Result<BlobStat, StoreError> {
        ctx.check()?;
        Ok(match self.blobs()?.get(digest) {
            Some(data) => BlobStat::Found(Descriptor::new(
                MEDIA_TYPE_OCTET_STREAM,
                data.len() as u64,
                digest.clone(),
            )),
            None => BlobStat::Unknown,
        })
    }

    fn put(&self, ctx: &Context, _media_type: &str, data: &[u8]) -> Result<Descriptor, StoreError> {
        ctx.check()?;
        let digest = Digest::from_bytes(data);
        self.blobs()?
            .entry(digest.clone())
            .or_insert_with(|| data.to_vec());
        Ok(Descriptor::new(
            MEDIA_TYPE_OCTET_STREAM,
            data.len() as u64,
            digest,
        ))
    }

    fn get(&self, ctx: &Context, digest: &Digest) -> Result<Vec<u8>, StoreError> {
        ctx.check()?;
        self.blobs()?
            .get(digest)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound(digest.to_string()))
    }
}
