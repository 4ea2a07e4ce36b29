//! Wire and catalog record types.
//!
//! The server speaks camelCase JSON; search responses carry many more fields
//! than the pipeline needs, so deserialization is deliberately tolerant of
//! unknown keys. The same [`Asset`] struct doubles as the persisted catalog
//! record, with the locally-computed fields (`download_file_name`,
//! `integrity`) omitted from JSON until they are populated.

use serde::{Deserialize, Serialize};

/// Origin tag the server assigns to assets imported from a mounted external
/// library. Assets carrying it are excluded from downloads and are the only
/// ones considered for album mirroring.
pub const LIBRARY_IMPORT_DEVICE_ID: &str = "Library Import";

/// Outcome of comparing a downloaded file against the server-declared
/// checksum. The `*Failed` variants are terminal: they mark assets whose
/// single retry also failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    Unchecked,
    Verified,
    Mismatch,
    NoChecksum,
    Missing,
    MissingFailed,
    MismatchFailed,
    FailedRedownload,
}

/// One media asset tracked by the server, plus the local sync state attached
/// to it over the course of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub original_file_name: String,
    /// Absolute path recorded at import time; only present for
    /// external-library assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Base64-encoded SHA1 of the content, declared by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Local filename actually written; differs from `original_file_name`
    /// when a collision was resolved. Set iff a download attempt succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<IntegrityStatus>,
}

impl Asset {
    pub fn is_external(&self) -> bool {
        self.device_id.as_deref() == Some(LIBRARY_IMPORT_DEVICE_ID)
    }
}

/// One page of a metadata search. `next_page` absent or null means this was
/// the last page.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<Asset>,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Search responses nest the page under an `assets` key.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub assets: SearchPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub id: String,
    pub album_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    pub id: String,
    pub album_name: String,
    #[serde(default)]
    pub assets: Vec<AlbumAssetRef>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumAssetRef {
    pub id: String,
}

/// Per-ID outcome returned by the album member-addition endpoint.
#[derive(Debug, Deserialize)]
pub struct BulkIdResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
