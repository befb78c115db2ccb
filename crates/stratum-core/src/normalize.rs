//! Flattening of layer references into uniform `LayerDescriptor` records.

use stratum_schema::{Descriptor, LayerDescriptor};

/// Anything that can be appended to a manifest under construction.
///
/// Every producer exposes a plain [`Descriptor`]. Producers that carry
/// layer-specific metadata (download URLs, a platform restriction) also
/// answer [`layer_descriptor`](Self::layer_descriptor) with the enriched
/// record; the default answer is `None`.
pub trait Describable {
    fn descriptor(&self) -> Descriptor;

    fn layer_descriptor(&self) -> Option<LayerDescriptor> {
        None
    }
}

impl Describable for Descriptor {
    fn descriptor(&self) -> Descriptor {
        self.clone()
    }
}

impl Describable for LayerDescriptor {
    fn descriptor(&self) -> Descriptor {
        self.descriptor.clone()
    }

    fn layer_descriptor(&self) -> Option<LayerDescriptor> {
        Some(self.clone())
    }
}

/// Convert a reference into the descriptor stored in the manifest.
///
/// The enriched form is used verbatim when the reference offers one;
/// otherwise the plain descriptor is wrapped with no extra fields.
pub fn normalize(reference: &dyn Describable) -> LayerDescriptor {
    match reference.layer_descriptor() {
        Some(enriched) => enriched,
        None => LayerDescriptor::plain(reference.descriptor()),
    }
}
