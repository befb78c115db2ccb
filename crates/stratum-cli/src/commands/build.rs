use super::{json_pretty, open_store, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stratum_core::{cancel_on_interrupt, pack_directory, Context, LocalLayer, ManifestBuilder};
use stratum_schema::MEDIA_TYPE_CONFIG;
use tracing::{info, warn};

pub fn run(
    store_path: &Path,
    config: &Path,
    layers: &[PathBuf],
    output: Option<&Path>,
    timeout: Option<u64>,
    json: bool,
) -> Result<u8, String> {
    let store = open_store(store_path)?;
    let config_bytes = fs::read(config)
        .map_err(|e| format!("failed to read config {}: {e}", config.display()))?;

    let root = Context::background();
    cancel_on_interrupt(root.clone());
    let ctx = match timeout {
        Some(secs) => root.with_timeout(Duration::from_secs(secs)),
        None => root,
    };

    let pb = if json {
        None
    } else {
        Some(spinner("building manifest..."))
    };

    let result = assemble(&store, &ctx, &config_bytes, layers);
    let manifest = match result {
        Ok(m) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "manifest built");
            }
            m
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "build failed");
            }
            return Err(e);
        }
    };

    let payload = manifest.payload().map_err(|e| e.to_string())?;
    let digest = manifest.digest().map_err(|e| e.to_string())?;

    if manifest.config.media_type != MEDIA_TYPE_CONFIG {
        warn!(
            "config blob {} was already stored and is recorded as {}; \
             the manifest digest differs from the build that first published it",
            manifest.config.digest, manifest.config.media_type
        );
    }

    if let Some(path) = output {
        fs::write(path, &payload)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    }

    if json {
        let summary = serde_json::json!({
            "digest": digest,
            "config": manifest.config.digest,
            "config_media_type": manifest.config.media_type,
            "layers": manifest.layers.len(),
            "output": output,
        });
        println!("{}", json_pretty(&summary)?);
    } else if output.is_some() {
        println!("manifest {digest}");
    } else {
        println!("{}", String::from_utf8_lossy(&payload));
    }
    Ok(EXIT_SUCCESS)
}

fn assemble(
    store: &stratum_store::FsBlobStore,
    ctx: &Context,
    config: &[u8],
    layers: &[PathBuf],
) -> Result<stratum_schema::Manifest, String> {
    let mut builder = ManifestBuilder::new(store, config);
    for path in layers {
        let data = read_layer(path)?;
        let layer = LocalLayer::publish(store, ctx, &data).map_err(|e| e.to_string())?;
        builder
            .append_reference(&layer)
            .map_err(|e| e.to_string())?;
        info!("added layer {}", path.display());
    }
    builder.build(ctx).map_err(|e| e.to_string())
}

fn read_layer(path: &Path) -> Result<Vec<u8>, String> {
    let meta = fs::metadata(path)
        .map_err(|e| format!("failed to read layer {}: {e}", path.display()))?;
    if meta.is_dir() {
        pack_directory(path).map_err(|e| format!("failed to pack {}: {e}", path.display()))
    } else {
        fs::read(path).map_err(|e| format!("failed to read layer {}: {e}", path.display()))
    }
}
