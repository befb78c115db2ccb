use super::{json_pretty, open_store, EXIT_STORE_ERROR, EXIT_SUCCESS};
use std::path::Path;
use stratum_store::{verify_store_integrity, Context};

pub fn run(store_path: &Path, json: bool) -> Result<u8, String> {
    let store = open_store(store_path)?;
    let report = verify_store_integrity(&Context::background(), store.layout())
        .map_err(|e| format!("store error: {e}"))?;

    if json {
        let payload = serde_json::json!({
            "checked": report.checked,
            "passed": report.passed,
            "failed": report.failed.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "store integrity: {}/{} blobs passed",
            report.passed, report.checked
        );
        for f in &report.failed {
            println!("  FAIL {}: {}", f.digest, f.reason);
        }
    }

    if report.failed.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_STORE_ERROR)
    }
}
