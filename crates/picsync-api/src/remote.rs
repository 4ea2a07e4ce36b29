use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::ApiError;
use crate::model::{AlbumDetail, AlbumSummary, BulkIdResult, SearchPage};

/// A boxed stream, used for HTTP response bodies so implementations can hide
/// their concrete stream types.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// A download body: chunks arrive as they come off the wire.
pub type ByteStream = BoxStream<'static, Result<Bytes, ApiError>>;

/// The server operations the sync pipeline consumes.
///
/// Every method returns `Result<_, ApiError>`; none of them retries. Policy
/// (fail-soft pagination, the bounded re-download, continue-on-error
/// deletion) lives entirely in the callers.
pub trait RemoteApi: Send + Sync {
    /// Health probe. A failure here is the one condition that aborts a run
    /// before any other call is made.
    fn ping(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Fetch one page of the metadata search, unfiltered.
    fn search_page(
        &self,
        size: u32,
        page: u32,
    ) -> impl Future<Output = Result<SearchPage, ApiError>> + Send;

    /// Open a streaming download of an asset's original content. Returns the
    /// body stream and the Content-Length when the server declares one.
    fn download(
        &self,
        asset_id: &str,
    ) -> impl Future<Output = Result<(ByteStream, Option<u64>), ApiError>> + Send;

    /// Bulk-delete assets by ID.
    fn delete_assets(
        &self,
        ids: &[String],
        force: bool,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Create an album containing the given assets. An empty name is stored
    /// as "Untitled".
    fn create_album(
        &self,
        album_name: &str,
        asset_ids: &[String],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Add assets to an existing album. The server reports success per ID;
    /// the call itself succeeds even when individual additions fail.
    fn add_to_album(
        &self,
        album_id: &str,
        asset_ids: &[String],
    ) -> impl Future<Output = Result<Vec<BulkIdResult>, ApiError>> + Send;

    fn list_albums(&self) -> impl Future<Output = Result<Vec<AlbumSummary>, ApiError>> + Send;

    fn album_detail(
        &self,
        album_id: &str,
    ) -> impl Future<Output = Result<AlbumDetail, ApiError>> + Send;
}
