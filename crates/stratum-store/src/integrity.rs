use crate::blob::BlobStore;
use crate::context::Context;
use crate::fs::FsBlobStore;
use crate::layout::StoreLayout;
use crate::StoreError;

#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub checked: usize,
    pub passed: usize,
    pub failed: Vec<IntegrityFailure>,
}

#[derive(Debug)]
pub struct IntegrityFailure {
    pub digest: String,
    pub reason: String,
}

/// Rehash every stored blob and report the ones that no longer match their
/// address. Stops early with a context error if `ctx` is cancelled.
pub fn verify_store_integrity(
    ctx: &Context,
    layout: &StoreLayout,
) -> Result<IntegrityReport, StoreError> {
    let store = FsBlobStore::new(layout.clone());
    let all = store.list()?;

    let mut report = IntegrityReport {
        checked: all.len(),
        ..Default::default()
    };

    for digest in &all {
        match store.get(ctx, digest) {
            Ok(_) => report.passed += 1,
            Err(StoreError::Context(e)) => return Err(e.into()),
            Err(StoreError::IntegrityFailure { actual, .. }) => {
                report.failed.push(IntegrityFailure {
                    digest: digest.to_string(),
                    reason: format!("digest mismatch: got {actual}"),
                });
            }
            Err(e) => {
                report.failed.push(IntegrityFailure {
                    digest: digest.to_string(),
                    reason: format!("read error: {e}"),
                });
            }
        }
    }

    Ok(report)
}
