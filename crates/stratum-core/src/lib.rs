//! Manifest construction for Stratum.
//!
//! This crate turns a configuration payload and an ordered list of layer
//! references into a finished `Manifest`. `ManifestBuilder` publishes the
//! configuration blob at most once under its digest, `normalize` flattens
//! every kind of layer producer into a uniform `LayerDescriptor`, and the
//! `layer` module provides the local and foreign producers plus
//! deterministic directory packing. Store calls honor a caller-supplied
//! `Context`; `cancel_on_interrupt` ties that context to Ctrl-C.

pub mod builder;
pub mod layer;
pub mod normalize;
pub mod signal;

pub use builder::ManifestBuilder;
pub use layer::{pack_directory, ForeignLayer, LocalLayer};
pub use normalize::{normalize, Describable};
pub use signal::cancel_on_interrupt;
pub use stratum_store::{Context, ContextError};

use stratum_schema::SchemaError;
use stratum_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store error: {0}")]
    Store(StoreError),
    #[error("build cancelled: {0}")]
    Cancelled(ContextError),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Context(ce) => Self::Cancelled(ce),
            other => Self::Store(other),
        }
    }
}

impl From<ContextError> for CoreError {
    fn from(e: ContextError) -> Self {
        Self::Cancelled(e)
    }
}
