//! Content identifiers, descriptors, and manifest values for Stratum.
//!
//! This crate defines the schema layer: the `Digest` content address
//! (blake3, `<algorithm>:<hex>`), the `Descriptor` and enriched
//! `LayerDescriptor` records that reference stored blobs, the media type
//! vocabulary, and the finalized, immutable `Manifest` together with its
//! canonical JSON payload.

pub mod descriptor;
pub mod manifest;
pub mod media_type;
pub mod types;

pub use descriptor::{Descriptor, LayerDescriptor, Platform};
pub use manifest::{Manifest, SCHEMA_VERSION};
pub use media_type::{
    MEDIA_TYPE_CONFIG, MEDIA_TYPE_FOREIGN_LAYER, MEDIA_TYPE_LAYER, MEDIA_TYPE_MANIFEST,
    MEDIA_TYPE_OCTET_STREAM,
};
pub use types::{Digest, DIGEST_ALGORITHM};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid digest: '{0}', expected 'blake3:<64 hex chars>'")]
    InvalidDigest(String),
    #[error("unsupported schema_version: {0}, expected {expected}", expected = SCHEMA_VERSION)]
    UnsupportedVersion(u32),
    #[error("manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
