//! The sync pipeline: catalog assembly, streaming downloads with collision
//! resolution, parallel integrity verification with a single bounded retry,
//! catalog persistence, deletion of verified assets, and album mirroring for
//! external-library imports.
//!
//! Everything is generic over [`picsync_api::RemoteApi`], so the whole
//! pipeline runs against an in-memory server double in tests.

pub mod album;
pub mod catalog;
pub mod download;
pub mod persist;
pub mod pipeline;
pub mod verify;

mod error;

pub use error::{Result, SyncError};
