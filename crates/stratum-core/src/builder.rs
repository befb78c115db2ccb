use crate::normalize::{normalize, Describable};
use crate::CoreError;
use stratum_schema::{Descriptor, Digest, LayerDescriptor, Manifest, MEDIA_TYPE_CONFIG};
use stratum_store::{BlobStat, BlobStore, Context};
use tracing::{debug, info};

/// Assembles a [`Manifest`] from a configuration payload and an ordered
/// sequence of layer references.
///
/// The configuration bytes are copied at construction, so later changes to
/// the caller's buffer cannot move the digest. References are append-only
/// and keep their append order, which is the layer stacking order.
///
/// [`build`](Self::build) borrows the builder immutably: a failed or
/// cancelled build leaves the accumulated references untouched and can
/// simply be retried.
pub struct ManifestBuilder<'a> {
    store: &'a dyn BlobStore,
    config: Box<[u8]>,
    layers: Vec<LayerDescriptor>,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(store: &'a dyn BlobStore, config: &[u8]) -> Self {
        Self {
            store,
            config: Box::from(config),
            layers: Vec::new(),
        }
    }

    /// The builder's private copy of the configuration payload.
    pub fn config(&self) -> &[u8] {
        &self.config
    }

    pub fn config_digest(&self) -> Digest {
        Digest::from_bytes(&self.config)
    }

    /// Normalize `reference` and append it as the next layer.
    pub fn append_reference(&mut self, reference: &dyn Describable) -> Result<(), CoreError> {
        let layer = normalize(reference);
        debug!(
            "appending layer {} ({}) at position {}",
            layer.descriptor.digest,
            layer.descriptor.media_type,
            self.layers.len()
        );
        self.layers.push(layer);
        Ok(())
    }

    /// Plain descriptors of every appended reference, in append order.
    pub fn references(&self) -> Vec<Descriptor> {
        self.layers.iter().map(|l| l.descriptor.clone()).collect()
    }

    /// Produce the finished manifest, publishing the configuration blob if
    /// the store does not already hold it.
    pub fn build(&self, ctx: &Context) -> Result<Manifest, CoreError> {
        let layers = self.layers.clone();
        let digest = self.config_digest();
        let config = self.resolve_config(ctx, &digest)?;
        info!(
            "built manifest with config {} and {} layer(s)",
            config.digest,
            layers.len()
        );
        Ok(Manifest::new(config, layers))
    }

    /// Reuse the stored configuration descriptor, or write the payload and
    /// correct the media type the store reports for it.
    ///
    /// Cancellation is checked before and after each store call; a call that
    /// returns after the context is done never contributes to a manifest.
    fn resolve_config(&self, ctx: &Context, digest: &Digest) -> Result<Descriptor, CoreError> {
        ctx.check()?;
        let stat = self.store.stat(ctx, digest);
        ctx.check()?;

        match stat? {
            BlobStat::Found(existing) => {
                debug!("config blob {digest} already stored, reusing");
                return Ok(existing);
            }
            BlobStat::Unknown => debug!("config blob {digest} unknown, publishing"),
        }

        let published = self.store.put(ctx, MEDIA_TYPE_CONFIG, &self.config);
        ctx.check()?;

        let mut descriptor = published?;
        descriptor.media_type = MEDIA_TYPE_CONFIG.to_owned();
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_schema::{MEDIA_TYPE_LAYER, MEDIA_TYPE_OCTET_STREAM};
    use stratum_store::MemoryBlobStore;

    const CONFIG: &[u8] = br#"{"architecture":"amd64","os":"linux"}"#;

    fn layer(content: &[u8]) -> Descriptor {
        Descriptor::for_content(MEDIA_TYPE_LAYER, content)
    }

    #[test]
    fn new_builder_has_no_references() {
        let store = MemoryBlobStore::new();
        let builder = ManifestBuilder::new(&store, CONFIG);
        assert!(builder.references().is_empty());
        assert_eq!(builder.config(), CONFIG);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn build_publishes_config_with_its_media_type() {
        let store = MemoryBlobStore::new();
        let builder = ManifestBuilder::new(&store, CONFIG);
        let manifest = builder.build(&Context::background()).unwrap();

        assert_eq!(manifest.config.digest, Digest::from_bytes(CONFIG));
        assert_eq!(manifest.config.size, CONFIG.len() as u64);
        assert_eq!(manifest.config.media_type, MEDIA_TYPE_CONFIG);
        assert!(store.contains(&manifest.config.digest).unwrap());
        assert!(manifest.layers.is_empty());
    }

    #[test]
    fn existing_config_descriptor_is_reused_as_stored() {
        let store = MemoryBlobStore::new();
        store
            .put(&Context::background(), MEDIA_TYPE_CONFIG, CONFIG)
            .unwrap();

        let builder = ManifestBuilder::new(&store, CONFIG);
        let manifest = builder.build(&Context::background()).unwrap();
        assert_eq!(manifest.config.digest, Digest::from_bytes(CONFIG));
        assert_eq!(manifest.config.media_type, MEDIA_TYPE_OCTET_STREAM);
    }

    #[test]
    fn layers_follow_append_order() {
        let store = MemoryBlobStore::new();
        let mut builder = ManifestBuilder::new(&store, CONFIG);
        let refs = [layer(b"one"), layer(b"two"), layer(b"three")];
        for r in &refs {
            builder.append_reference(r).unwrap();
        }

        assert_eq!(builder.references(), refs.to_vec());
        let manifest = builder.build(&Context::background()).unwrap();
        let built: Vec<_> = manifest.layers.into_iter().map(|l| l.descriptor).collect();
        assert_eq!(built, refs.to_vec());
    }

    #[test]
    fn duplicate_references_are_kept() {
        let store = MemoryBlobStore::new();
        let mut builder = ManifestBuilder::new(&store, CONFIG);
        builder.append_reference(&layer(b"same")).unwrap();
        builder.append_reference(&layer(b"same")).unwrap();
        assert_eq!(builder.references().len(), 2);
    }

    #[test]
    fn cancelled_context_builds_nothing() {
        let store = MemoryBlobStore::new();
        let mut builder = ManifestBuilder::new(&store, CONFIG);
        builder.append_reference(&layer(b"l")).unwrap();

        let ctx = Context::background();
        ctx.cancel();
        assert!(matches!(
            builder.build(&ctx),
            Err(CoreError::Cancelled(stratum_store::ContextError::Cancelled))
        ));
        assert!(store.is_empty().unwrap());
        assert_eq!(builder.references().len(), 1);
    }
}
