use super::{json_pretty, open_store, EXIT_SUCCESS};
use std::path::Path;
use stratum_schema::Digest;
use stratum_store::{BlobStat, BlobStore, Context};

pub fn run(store_path: &Path, digest: &str, json: bool) -> Result<u8, String> {
    let digest = Digest::parse(digest).map_err(|e| e.to_string())?;
    let store = open_store(store_path)?;

    let descriptor = match store
        .stat(&Context::background(), &digest)
        .map_err(|e| format!("store error: {e}"))?
    {
        BlobStat::Found(d) => d,
        BlobStat::Unknown => return Err(format!("blob unknown: {digest}")),
    };

    if json {
        println!("{}", json_pretty(&descriptor)?);
    } else {
        println!("digest:     {}", descriptor.digest);
        println!("size:       {}", descriptor.size);
        println!("media type: {}", descriptor.media_type);
    }
    Ok(EXIT_SUCCESS)
}
