//! Whole-file JSON documents with atomic replacement.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::StoreError;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to `tmp` and flush it to the device.
async fn write_synced(tmp: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

/// Serialize `value` and replace `path` with it in one rename.
///
/// The temp file is synced before the rename, so a crash leaves either the
/// old document or the complete new one.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, content.as_bytes()).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    debug!("Wrote {:?}", path);
    Ok(())
}

/// Read a document.
///
/// A missing file is `Ok(None)`. A malformed file is logged and also
/// treated as missing.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Ignoring malformed {:?}: {}", path, e);
            Ok(None)
        }
    }
}
