use crate::context::Context;
use crate::StoreError;
use stratum_schema::{Descriptor, Digest};

/// Outcome of looking a digest up in a blob store.
///
/// A missing blob is an expected answer, not a failure, so it is a value
/// here and real store errors stay in the `Err` arm of the surrounding
/// `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobStat {
    Found(Descriptor),
    Unknown,
}

impl BlobStat {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_descriptor(self) -> Option<Descriptor> {
        match self {
            Self::Found(d) => Some(d),
            Self::Unknown => None,
        }
    }
}

/// Content-addressed blob storage keyed by [`Digest`].
///
/// Implementations must tolerate concurrent `stat`/`put` calls for the same
/// digest from independent callers and keep at most one stored copy per
/// digest. Callers get no retries from this layer.
pub trait BlobStore: Send + Sync {
    /// Look up the blob stored under `digest`.
    fn stat(&self, ctx: &Context, digest: &Digest) -> Result<BlobStat, StoreError>;

    /// Store `data` under its own digest.
    ///
    /// The write path does not interpret content: the returned descriptor's
    /// media type is always `application/octet-stream`, whatever
    /// `media_type` the caller passed. Digest and size describe `data`.
    fn put(&self, ctx: &Context, media_type: &str, data: &[u8]) -> Result<Descriptor, StoreError>;

    /// Read a blob back, verifying it still matches its digest.
    fn get(&self, ctx: &Context, digest: &Digest) -> Result<Vec<u8>, StoreError>;
}
