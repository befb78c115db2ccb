//! Layer producers and deterministic packing of directory trees.

use crate::normalize::Describable;
use crate::CoreError;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use stratum_schema::{
    Descriptor, Digest, LayerDescriptor, Platform, MEDIA_TYPE_FOREIGN_LAYER, MEDIA_TYPE_LAYER,
};
use stratum_store::{BlobStore, Context};
use tracing::{debug, warn};

/// A layer whose bytes are held by the local blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalLayer {
    descriptor: Descriptor,
}

impl LocalLayer {
    /// Write `data` to the store and describe it as a tar layer.
    pub fn publish(store: &dyn BlobStore, ctx: &Context, data: &[u8]) -> Result<Self, CoreError> {
        let mut descriptor = store.put(ctx, MEDIA_TYPE_LAYER, data)?;
        descriptor.media_type = MEDIA_TYPE_LAYER.to_owned();
        Ok(Self { descriptor })
    }
}

impl Describable for LocalLayer {
    fn descriptor(&self) -> Descriptor {
        self.descriptor.clone()
    }
}

/// A layer that is not stored locally and must be fetched from one of its
/// URLs. Its manifest entry carries the URLs and optional platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignLayer {
    digest: Digest,
    size: u64,
    urls: Vec<String>,
    platform: Option<Platform>,
}

impl ForeignLayer {
    pub fn new(digest: Digest, size: u64, urls: Vec<String>) -> Self {
        Self {
            digest,
            size,
            urls,
            platform: None,
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }
}

impl Describable for ForeignLayer {
    fn descriptor(&self) -> Descriptor {
        Descriptor::new(MEDIA_TYPE_FOREIGN_LAYER, self.size, self.digest.clone())
    }

    fn layer_descriptor(&self) -> Option<LayerDescriptor> {
        Some(LayerDescriptor {
            descriptor: self.descriptor(),
            urls: self.urls.clone(),
            platform: self.platform.clone(),
        })
    }
}

/// Pack a directory tree into a reproducible tar archive.
///
/// Entries are sorted by relative path; timestamps are zeroed, ownership
/// is 0:0, and permission bits are kept. Regular files, directories and
/// symlinks are packed; anything else is skipped with a warning.
pub fn pack_directory(root: &Path) -> Result<Vec<u8>, CoreError> {
    let mut paths = Vec::new();
    walk(root, Path::new(""), &mut paths)?;
    paths.sort();

    let mut ar = tar::Builder::new(Vec::new());
    ar.follow_symlinks(false);

    for rel in &paths {
        let full = root.join(rel);
        let meta = full.symlink_metadata()?;
        let ft = meta.file_type();

        let mut header = tar::Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mode(meta.permissions().mode());

        if ft.is_file() {
            let data = fs::read(&full)?;
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(data.len() as u64);
            header.set_cksum();
            ar.append_data(&mut header, rel, data.as_slice())?;
        } else if ft.is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_cksum();
            ar.append_data(&mut header, rel, std::io::empty())?;
        } else if ft.is_symlink() {
            let target = fs::read_link(&full)?;
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_size(0);
            header.set_cksum();
            ar.append_link(&mut header, rel, &target)?;
        } else {
            warn!("skipping unsupported file type: {}", rel.display());
        }
    }

    let data = ar.into_inner()?;
    debug!("packed {} entries from {}", paths.len(), root.display());
    Ok(data)
}

fn walk(root: &Path, rel: &Path, out: &mut Vec<PathBuf>) -> Result<(), CoreError> {
    for entry in fs::read_dir(root.join(rel))? {
        let entry = entry?;
        let child = rel.join(entry.file_name());
        let is_dir = entry.file_type()?.is_dir();
        out.push(child.clone());
        if is_dir {
            walk(root, &child, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use std::collections::BTreeSet;
    use stratum_schema::MEDIA_TYPE_OCTET_STREAM;
    use stratum_store::MemoryBlobStore;

    fn fixture(dir: &Path) {
        fs::write(dir.join("hello.txt"), "hello world").unwrap();
        fs::create_dir_all(dir.join("etc/app")).unwrap();
        fs::write(dir.join("etc/app/config"), "key=value").unwrap();
        std::os::unix::fs::symlink("hello.txt", dir.join("link")).unwrap();
    }

    fn entry_names(data: &[u8]) -> Vec<String> {
        let mut ar = tar::Archive::new(data);
        ar.entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                e.path().unwrap().to_string_lossy().trim_end_matches('/').to_owned()
            })
            .collect()
    }

    #[test]
    fn pack_is_deterministic_across_trees() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fixture(a.path());
        fixture(b.path());
        assert_eq!(
            pack_directory(a.path()).unwrap(),
            pack_directory(b.path()).unwrap()
        );
    }

    #[test]
    fn pack_sorts_entries_and_keeps_kinds() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path());
        let data = pack_directory(dir.path()).unwrap();

        let names = entry_names(&data);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        let set: BTreeSet<_> = names.into_iter().collect();
        assert!(set.contains("hello.txt"));
        assert!(set.contains("etc/app/config"));
        assert!(set.contains("link"));

        let mut ar = tar::Archive::new(data.as_slice());
        for entry in ar.entries().unwrap() {
            let entry = entry.unwrap();
            assert_eq!(entry.header().mtime().unwrap(), 0);
            assert_eq!(entry.header().uid().unwrap(), 0);
            if entry.path().unwrap().ends_with("link") {
                assert_eq!(entry.header().entry_type(), tar::EntryType::Symlink);
            }
        }
    }

    #[test]
    fn pack_changes_when_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path());
        let before = pack_directory(dir.path()).unwrap();
        fs::write(dir.path().join("hello.txt"), "changed").unwrap();
        assert_ne!(before, pack_directory(dir.path()).unwrap());
    }

    #[test]
    fn local_layer_has_layer_media_type() {
        let store = MemoryBlobStore::new();
        let layer = LocalLayer::publish(&store, &Context::background(), b"tar").unwrap();
        let d = layer.descriptor();
        assert_eq!(d.media_type, MEDIA_TYPE_LAYER);
        assert_ne!(d.media_type, MEDIA_TYPE_OCTET_STREAM);
        assert!(store.contains(&d.digest).unwrap());
        assert!(normalize(&layer).is_plain());
    }

    #[test]
    fn foreign_layer_normalizes_to_enriched_form() {
        let layer = ForeignLayer::new(
            Digest::from_bytes(b"remote base"),
            11,
            vec!["https://cdn.example/base.tar".to_owned()],
        )
        .with_platform(Platform {
            architecture: "amd64".to_owned(),
            os: "windows".to_owned(),
            ..Platform::default()
        });

        let ld = normalize(&layer);
        assert_eq!(ld.descriptor.media_type, MEDIA_TYPE_FOREIGN_LAYER);
        assert_eq!(ld.urls.len(), 1);
        assert_eq!(ld.platform.unwrap().os, "windows");
        assert_eq!(layer.descriptor().digest, Digest::from_bytes(b"remote base"));
    }
}
