use crate::descriptor::{Descriptor, LayerDescriptor};
use crate::media_type::MEDIA_TYPE_MANIFEST;
use crate::types::Digest;
use crate::SchemaError;
use serde::{Deserialize, Serialize};

/// Schema version of the manifests this crate produces and accepts.
pub const SCHEMA_VERSION: u32 = 2;

/// A finalized image manifest: one configuration blob and the ordered
/// layers stacked on top of each other.
///
/// Layer order is the stacking order and is preserved exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: u32,
    pub media_type: String,
    pub config: Descriptor,
    pub layers: Vec<LayerDescriptor>,
}

impl Manifest {
    pub fn new(config: Descriptor, layers: Vec<LayerDescriptor>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            media_type: MEDIA_TYPE_MANIFEST.to_owned(),
            config,
            layers,
        }
    }

    /// Every blob this manifest points at: the configuration first, then
    /// each layer in stacking order.
    pub fn references(&self) -> Vec<Descriptor> {
        let mut refs = Vec::with_capacity(self.layers.len() + 1);
        refs.push(self.config.clone());
        refs.extend(self.layers.iter().map(|l| l.descriptor.clone()));
        refs
    }

    /// Canonical serialized form. Stable for equal manifests.
    pub fn payload(&self) -> Result<Vec<u8>, SchemaError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Content address of [`payload`](Self::payload).
    pub fn digest(&self) -> Result<Digest, SchemaError> {
        Ok(Digest::from_bytes(&self.payload()?))
    }

    pub fn from_payload(data: &[u8]) -> Result<Self, SchemaError> {
        let manifest: Manifest = serde_json::from_slice(data)?;
        if manifest.schema_version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion(manifest.schema_version));
        }
        Ok(manifest)
    }
}
