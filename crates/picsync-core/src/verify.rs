//! Integrity classification and the bounded retry loop.
//!
//! Hashing is CPU-bound and independent per asset, so the first pass fans
//! out over blocking workers and re-merges results in input order. Retry is
//! deliberately sequential: it reuses the download path, and one request in
//! flight keeps its failure handling trivial.

use std::io::Read;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use picsync_api::{Asset, IntegrityStatus, RemoteApi};
use sha1::{Digest, Sha1};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

const HASH_BUF_SIZE: usize = 8 * 1024;

/// Streamed SHA1 of a file, base64-encoded the way the server declares
/// checksums.
pub fn sha1_base64(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buf = [0u8; HASH_BUF_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(BASE64.encode(hasher.finalize()))
}

/// Classify one asset against the server-declared checksum.
///
/// Evaluated in order: no recorded download, or recorded file gone from
/// disk, is `Missing`; no declared checksum is `NoChecksum` (acceptable,
/// just unverifiable); otherwise the streamed digest decides `Verified` or
/// `Mismatch`. A read error while hashing counts as `Mismatch`,
/// fail-closed.
pub fn classify(asset: &Asset, data_dir: &Path) -> IntegrityStatus {
    let Some(file_name) = asset.download_file_name.as_deref() else {
        return IntegrityStatus::Missing;
    };
    let path = data_dir.join(file_name);
    if !path.exists() {
        return IntegrityStatus::Missing;
    }
    let Some(expected) = asset.checksum.as_deref() else {
        return IntegrityStatus::NoChecksum;
    };

    match sha1_base64(&path) {
        Ok(actual) if actual == expected => IntegrityStatus::Verified,
        Ok(_) => IntegrityStatus::Mismatch,
        Err(err) => {
            warn!(name = %file_name, error = %err, "hashing failed, treating as mismatch");
            IntegrityStatus::Mismatch
        }
    }
}

/// Worker bound for the classification fan-out: everything the host offers
/// minus one core kept free, never below one.
fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

/// First-pass classification of every asset, fanned out over at most
/// [`worker_count`] blocking tasks, results re-ordered to input order.
async fn classify_all(assets: &[Asset], data_dir: &Path) -> Vec<IntegrityStatus> {
    let workers = worker_count();
    let mut statuses = vec![IntegrityStatus::Unchecked; assets.len()];
    let mut join: JoinSet<(usize, IntegrityStatus)> = JoinSet::new();
    let mut next = 0usize;

    while next < assets.len() || !join.is_empty() {
        while next < assets.len() && join.len() < workers {
            let asset = assets[next].clone();
            let dir: PathBuf = data_dir.to_path_buf();
            let idx = next;
            join.spawn_blocking(move || (idx, classify(&asset, &dir)));
            next += 1;
        }
        match join.join_next().await {
            Some(Ok((idx, status))) => statuses[idx] = status,
            Some(Err(err)) => error!(error = %err, "classification worker failed"),
            None => break,
        }
    }

    statuses
}

/// Terminal status for an asset whose single retry also came back bad.
fn terminal(second: IntegrityStatus) -> IntegrityStatus {
    match second {
        IntegrityStatus::Missing => IntegrityStatus::MissingFailed,
        IntegrityStatus::Mismatch => IntegrityStatus::MismatchFailed,
        other => other,
    }
}

/// One re-download plus re-classification for an asset flagged on the first
/// pass. Every outcome of this function is final: there is no second retry.
async fn retry_once(
    api: &impl RemoteApi,
    asset: &mut Asset,
    first: IntegrityStatus,
    data_dir: &Path,
) -> IntegrityStatus {
    warn!(
        name = %asset.original_file_name,
        status = ?first,
        "integrity check failed, re-downloading"
    );

    let Some(file_name) = crate::download::download_one(api, asset, data_dir).await else {
        return IntegrityStatus::FailedRedownload;
    };
    asset.download_file_name = Some(file_name);

    let reclassify = {
        let asset = asset.clone();
        let dir = data_dir.to_path_buf();
        tokio::task::spawn_blocking(move || classify(&asset, &dir)).await
    };
    match reclassify {
        Ok(second) => terminal(second),
        Err(err) => {
            error!(error = %err, "re-classification worker failed, treating as mismatch");
            IntegrityStatus::MismatchFailed
        }
    }
}

/// Classify every asset and retry the failures once, storing the final
/// status on each record.
///
/// Assets that come back `Verified` or `NoChecksum` on the first pass are
/// never touched again; `Missing` and `Mismatch` get exactly one
/// re-download, after which the status is terminal.
pub async fn verify_all(api: &impl RemoteApi, assets: &mut [Asset], data_dir: &Path) {
    if assets.is_empty() {
        return;
    }

    info!(total = assets.len(), workers = worker_count(), "verifying integrity");
    let first_pass = classify_all(assets, data_dir).await;

    let missing = first_pass
        .iter()
        .filter(|s| **s == IntegrityStatus::Missing)
        .count();
    let mismatch = first_pass
        .iter()
        .filter(|s| **s == IntegrityStatus::Mismatch)
        .count();
    info!(missing, mismatch, "integrity summary before retry");

    for (asset, first) in assets.iter_mut().zip(first_pass) {
        let status = match first {
            IntegrityStatus::Missing | IntegrityStatus::Mismatch => {
                retry_once(api, asset, first, data_dir).await
            }
            other => other,
        };
        asset.integrity = Some(status);
    }

    let verified = assets
        .iter()
        .filter(|a| a.integrity == Some(IntegrityStatus::Verified))
        .count();
    info!(verified, total = assets.len(), "verification complete");
}
