//! Streaming downloads with duplicate-filename resolution.

use std::path::Path;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use picsync_api::{Asset, RemoteApi};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::error::Result;

/// How many `<stem>_<n><ext>` candidates are probed before a download is
/// refused outright instead of risking an overwrite.
pub const COLLISION_PROBE_LIMIT: u32 = 1000;

const PB_STYLE: &str = "{prefix:>30} {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})";

/// Pick a local filename for `original_name` that does not collide with an
/// existing file in `dir`: the name itself, then `<stem>_1<ext>`,
/// `<stem>_2<ext>`, ... Returns `None` once the probe limit is exhausted.
pub fn resolve_collision(dir: &Path, original_name: &str) -> Option<String> {
    if !dir.join(original_name).exists() {
        return Some(original_name.to_string());
    }

    let (stem, ext) = split_name(original_name);
    (1..=COLLISION_PROBE_LIMIT)
        .map(|n| format!("{stem}_{n}{ext}"))
        .find(|candidate| !dir.join(candidate).exists())
}

/// Split a filename into stem and extension (dot included). A leading dot is
/// part of the stem, so dotfiles get suffixed as `.name_1`.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Download one asset into `data_dir`, returning the local filename actually
/// written, or `None` on any failure.
///
/// Failure never dirties the record: a partially written file may remain on
/// disk, but nothing references it and a later collision probe will step
/// around it. The caller decides whether to store the returned name.
pub async fn download_one(
    api: &impl RemoteApi,
    asset: &Asset,
    data_dir: &Path,
) -> Option<String> {
    let Some(file_name) = resolve_collision(data_dir, &asset.original_file_name) else {
        warn!(
            name = %asset.original_file_name,
            limit = COLLISION_PROBE_LIMIT,
            "no free filename under probe limit, skipping download"
        );
        return None;
    };

    match stream_to_file(api, asset, &data_dir.join(&file_name)).await {
        Ok(bytes) => {
            info!(name = %file_name, bytes, "downloaded");
            Some(file_name)
        }
        Err(err) => {
            error!(name = %asset.original_file_name, error = %err, "download failed");
            None
        }
    }
}

async fn stream_to_file(api: &impl RemoteApi, asset: &Asset, path: &Path) -> Result<u64> {
    let (mut stream, total) = api.download(&asset.id).await?;
    let bar = download_bar(&asset.original_file_name, total);

    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        bar.inc(chunk.len() as u64);
    }
    file.flush().await?;

    bar.finish_and_clear();
    Ok(written)
}

fn download_bar(name: &str, total: Option<u64>) -> ProgressBar {
    let bar = match total {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::hidden(),
    };
    if let Ok(style) = ProgressStyle::with_template(PB_STYLE) {
        bar.set_style(style);
    }
    let prefix: String = name.chars().take(30).collect();
    bar.set_prefix(prefix);
    bar
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadTally {
    pub succeeded: usize,
    pub failed: usize,
}

/// Download every asset in input order, recording the chosen filename on
/// success. Individual failures never abort the batch.
pub async fn download_all(
    api: &impl RemoteApi,
    assets: &mut [Asset],
    data_dir: &Path,
) -> DownloadTally {
    let total = assets.len();
    let mut tally = DownloadTally::default();

    for (i, asset) in assets.iter_mut().enumerate() {
        info!(n = i + 1, total, name = %asset.original_file_name, "downloading");
        match download_one(api, asset, data_dir).await {
            Some(file_name) => {
                asset.download_file_name = Some(file_name);
                tally.succeeded += 1;
            }
            None => tally.failed += 1,
        }
    }

    info!(
        succeeded = tally.succeeded,
        failed = tally.failed,
        "download pass complete"
    );
    tally
}
