//! Durable catalog output and the deletion driver that consumes it.

use std::path::Path;

use picsync_api::{Asset, IntegrityStatus, RemoteApi};
use tracing::{debug, error, info};

use crate::error::{Result, SyncError};

/// File the post-run catalog is written to, under the output directory.
pub const CATALOG_FILE_NAME: &str = "downloaded_assets.json";

/// Upper bound on IDs per delete call.
pub const DELETE_CHUNK_SIZE: usize = 100;

/// Write the whole catalog as a pretty-printed JSON array.
pub fn save_catalog(path: &Path, assets: &[Asset]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(assets).map_err(|source| SyncError::Catalog {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), count = assets.len(), "catalog saved");
    Ok(())
}

pub fn load_catalog(path: &Path) -> Result<Vec<Asset>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| SyncError::Catalog {
        path: path.to_path_buf(),
        source,
    })
}

/// IDs of assets whose download round-tripped with a matching checksum;
/// everything else stays on the server.
pub fn verified_ids(assets: &[Asset]) -> Vec<String> {
    assets
        .iter()
        .filter(|a| a.integrity == Some(IntegrityStatus::Verified))
        .map(|a| a.id.clone())
        .collect()
}

/// Delete the given IDs in chunks of at most [`DELETE_CHUNK_SIZE`]. A failed
/// chunk is logged and skipped; there is no retry. Returns how many IDs were
/// submitted in successful calls.
pub async fn delete_assets(api: &impl RemoteApi, ids: &[String], force: bool) -> usize {
    let chunk_count = ids.len().div_ceil(DELETE_CHUNK_SIZE);
    let mut deleted = 0usize;

    for (i, chunk) in ids.chunks(DELETE_CHUNK_SIZE).enumerate() {
        debug!(chunk = i + 1, of = chunk_count, size = chunk.len(), "deleting chunk");
        match api.delete_assets(chunk, force).await {
            Ok(()) => deleted += chunk.len(),
            Err(err) => {
                error!(chunk = i + 1, error = %err, "delete call failed, continuing");
            }
        }
    }

    info!(deleted, requested = ids.len(), "deletion complete");
    deleted
}
