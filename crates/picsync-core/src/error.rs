use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] picsync_api::ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed catalog file {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
