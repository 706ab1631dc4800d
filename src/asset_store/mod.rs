/// Asset storage for uploaded content
///
/// Handles the files referenced by database records: uploaded images for
/// projects and markdown bodies for articles. Stored names are internal;
/// every read path rewrites them to public URLs before they leave the API.
pub mod disk;
pub mod names;

pub use disk::DiskAssetBackend;

use crate::error::ApiResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Asset storage backend trait
///
/// Implementations handle the actual storage and retrieval of asset data.
#[async_trait]
pub trait AssetBackend: Send + Sync {
    /// Store an asset under its generated name
    async fn put(&self, name: &str, data: &[u8]) -> ApiResult<()>;

    /// Delete an asset; a missing file is treated as already deleted
    async fn delete(&self, name: &str) -> ApiResult<()>;

    /// Check whether an asset exists
    async fn exists(&self, name: &str) -> ApiResult<bool>;
}

/// Facade over an asset backend plus the public URL resolver
///
/// Callers must store an asset before persisting a reference to it, and
/// only delete a superseded asset after the replacement reference has been
/// durably written. A crash mid-update then leaves at worst an orphaned
/// file, never a record pointing at a missing one.
#[derive(Clone)]
pub struct AssetStore {
    backend: Arc<dyn AssetBackend>,
    public_base_url: String,
}

impl AssetStore {
    pub fn new(backend: Arc<dyn AssetBackend>, public_base_url: &str) -> Self {
        Self {
            backend,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Store an uploaded file under its generated name
    pub async fn store(&self, name: &str, data: &[u8]) -> ApiResult<()> {
        self.backend.put(name, data).await
    }

    /// Delete a stored asset (idempotent)
    pub async fn remove(&self, name: &str) -> ApiResult<()> {
        self.backend.delete(name).await
    }

    /// Delete a superseded or orphaned asset without affecting the caller
    ///
    /// Cleanup failures are logged and swallowed; they never change the
    /// HTTP outcome of the mutation that triggered them.
    pub async fn remove_best_effort(&self, name: &str) {
        if let Err(e) = self.backend.delete(name).await {
            tracing::warn!(asset = %name, error = %e, "failed to clean up stored asset");
        }
    }

    pub async fn contains(&self, name: &str) -> ApiResult<bool> {
        self.backend.exists(name).await
    }

    /// Resolve a stored name to its externally reachable URL
    pub fn public_url(&self, name: &str) -> String {
        format!("{}/public/{}", self.public_base_url, name)
    }
}
