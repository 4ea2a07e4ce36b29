//! Gateway to the photo server's REST API.
//!
//! The [`RemoteApi`] trait is the seam between the sync pipeline and the
//! network: every endpoint the pipeline touches is a method here, and every
//! method maps transport failures to [`ApiError`] so callers can convert them
//! to status values at their own boundary. [`HttpRemote`] is the production
//! implementation; tests substitute their own.

mod error;
mod http;
mod model;
mod remote;

pub use error::ApiError;
pub use http::HttpRemote;
pub use model::{
    Asset, AlbumAssetRef, AlbumDetail, AlbumSummary, BulkIdResult, IntegrityStatus, SearchPage,
    LIBRARY_IMPORT_DEVICE_ID,
};
pub use remote::{BoxStream, ByteStream, RemoteApi};
