use crate::error::{Error, Result};
use crate::placeholders::reset_keys;
use crate::replacements::build_replacement_map;
use crate::service::{Outcome, SlideSync};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Reads a weekly payload from `path`, or from stdin when `path` is `-`.
pub async fn read_payload(path: &Path) -> Result<Value> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?
    };
    debug!("payload bytes: {}", raw.len());
    Ok(serde_json::from_str(&raw)?)
}

pub async fn run_update(sync: &SlideSync, path: &Path) -> Result<Outcome> {
    let data = read_payload(path).await?;
    sync.update(&data).await
}

/// Replacement map as sorted, pretty-printed JSON.
pub fn preview(data: &Value) -> Result<String> {
    let sorted: BTreeMap<String, String> = build_replacement_map(data).into_iter().collect();
    Ok(serde_json::to_string_pretty(&sorted)?)
}

pub fn list_keys() -> String {
    reset_keys().join("\n")
}
