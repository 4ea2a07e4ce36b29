//! End-to-end runs wired together from the stage modules.

use std::path::{Path, PathBuf};

use picsync_api::{Asset, RemoteApi};
use tracing::info;

use crate::album;
use crate::catalog::{self, OriginFilter};
use crate::download;
use crate::error::Result;
use crate::persist;
use crate::verify;

/// Subdirectory of the output directory that holds the downloaded binaries.
pub const DATA_DIR_NAME: &str = "data";

#[derive(Debug, Clone)]
pub struct DownloadRun {
    pub output_dir: PathBuf,
    pub page_size: u32,
    /// Fetch and persist the catalog without downloading anything.
    pub list_only: bool,
}

impl DownloadRun {
    pub fn catalog_path(&self) -> PathBuf {
        self.output_dir.join(persist::CATALOG_FILE_NAME)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join(DATA_DIR_NAME)
    }
}

/// The full download pipeline: catalog, persist, download, verify, persist
/// again with outcomes. Returns the final catalog.
pub async fn run_download(api: &impl RemoteApi, run: &DownloadRun) -> Result<Vec<Asset>> {
    let data_dir = run.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let mut assets =
        catalog::fetch_catalog(api, OriginFilter::ExcludeExternal, run.page_size).await;
    if assets.is_empty() {
        info!("no assets to download");
        return Ok(assets);
    }

    let catalog_path = run.catalog_path();
    persist::save_catalog(&catalog_path, &assets)?;

    if run.list_only {
        info!("list-only run, skipping downloads");
        return Ok(assets);
    }

    download::download_all(api, &mut assets, &data_dir).await;
    verify::verify_all(api, &mut assets, &data_dir).await;

    persist::save_catalog(&catalog_path, &assets)?;
    Ok(assets)
}

/// The album-mirroring pipeline for external-library assets.
pub async fn run_albums(
    api: &impl RemoteApi,
    library_root: &Path,
    page_size: u32,
    only_new: bool,
) -> Result<()> {
    let assets = catalog::fetch_catalog(api, OriginFilter::OnlyExternal, page_size).await;
    if assets.is_empty() {
        info!("no external-library assets found");
        return Ok(());
    }

    let tree = album::fetch_album_tree(api).await;
    let plan = album::plan_albums(&assets, &tree, library_root, only_new);
    if plan.is_empty() {
        info!("nothing to do, all assets already organized");
        return Ok(());
    }

    album::apply_plan(api, &plan).await;
    Ok(())
}

/// The deletion pipeline: read a persisted catalog and delete everything it
/// marks as verified.
pub async fn run_delete(api: &impl RemoteApi, deletion_file: &Path, force: bool) -> Result<usize> {
    let assets = persist::load_catalog(deletion_file)?;
    let ids = persist::verified_ids(&assets);
    info!(
        candidates = ids.len(),
        records = assets.len(),
        file = %deletion_file.display(),
        "deleting verified assets"
    );
    Ok(persist::delete_assets(api, &ids, force).await)
}
