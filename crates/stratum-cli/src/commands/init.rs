use super::{json_pretty, open_store, EXIT_SUCCESS};
use std::path::Path;

pub fn run(store_path: &Path, json: bool) -> Result<u8, String> {
    let store = open_store(store_path)?;
    if json {
        let payload = serde_json::json!({
            "store": store.layout().root(),
            "status": "initialized"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("initialized store at {}", store.layout().root().display());
    }
    Ok(EXIT_SUCCESS)
}
