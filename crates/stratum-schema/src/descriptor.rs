use crate::types::Digest;
use serde::{Deserialize, Serialize};

/// Reference to a stored blob: what it is, how big it is, and its address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: String,
    pub size: u64,
    pub digest: Digest,
}

impl Descriptor {
    pub fn new(media_type: impl Into<String>, size: u64, digest: Digest) -> Self {
        Self {
            media_type: media_type.into(),
            size,
            digest,
        }
    }

    /// Describe `data` as it would be stored, without storing it.
    pub fn for_content(media_type: impl Into<String>, data: &[u8]) -> Self {
        Self::new(media_type, data.len() as u64, Digest::from_bytes(data))
    }
}

/// Target platform hint for layers that only apply to some hosts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Platform {
    pub architecture: String,
    pub os: String,
    #[serde(rename = "os.version", default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(rename = "os.features", default, skip_serializing_if = "Vec::is_empty")]
    pub os_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// A layer entry in a manifest: the plain descriptor plus optional fields
/// that only some layer producers supply (download URLs for foreign
/// content, a platform restriction).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerDescriptor {
    #[serde(flatten)]
    pub descriptor: Descriptor,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

impl LayerDescriptor {
    /// Wrap a plain descriptor with no extra fields.
    pub fn plain(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            urls: Vec::new(),
            platform: None,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.urls.is_empty() && self.platform.is_none()
    }
}

impl From<Descriptor> for LayerDescriptor {
    fn from(descriptor: Descriptor) -> Self {
        Self::plain(descriptor)
    }
}
