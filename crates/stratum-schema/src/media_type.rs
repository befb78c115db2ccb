//! Media type vocabulary for manifests, configuration, and layers.

/// Media type of a finalized image manifest.
pub const MEDIA_TYPE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";

/// Media type of the image configuration blob.
pub const MEDIA_TYPE_CONFIG: &str = "application/vnd.oci.image.config.v1+json";

/// Media type of a locally stored, uncompressed tar layer.
pub const MEDIA_TYPE_LAYER: &str = "application/vnd.oci.image.layer.v1.tar";

/// Media type of a layer whose content lives outside the store and is
/// fetched from one of its URLs.
pub const MEDIA_TYPE_FOREIGN_LAYER: &str = "application/vnd.oci.image.layer.nondistributable.v1.tar";

/// Classification a generic blob write assigns, regardless of what the
/// caller intended to store.
pub const MEDIA_TYPE_OCTET_STREAM: &str = "application/octet-stream";
