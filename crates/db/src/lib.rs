//! Storage backends for the bookshop service.
//!
//! [`MemoryCollection`] is a document collection keyed by server-assigned ids and
//! [`FsBucket`] is a flat directory of named binary blobs.

pub mod bucket;
pub mod collection;
mod sniff;

pub use bucket::{Blob, BlobInfo, FsBucket};
pub use collection::{Document, DocumentStream, MemoryCollection};

use thiserror::Error;

/// Failures raised by a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Open the blob bucket rooted at `image_dir`, creating the directory when absent.
pub async fn open_bucket(image_dir: &std::path::Path) -> anyhow::Result<FsBucket> {
    use anyhow::Context;

    tokio::fs::create_dir_all(image_dir)
        .await
        .with_context(|| format!("failed to create image directory {}", image_dir.display()))?;

    tracing::info!(target: "bookshop-db", dir = %image_dir.display(), "image bucket opened");
    Ok(FsBucket::new(image_dir))
}
