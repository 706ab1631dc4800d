/// Disk-based asset storage backend
use crate::{
    asset_store::AssetBackend,
    error::{ApiError, ApiResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Disk storage backend
///
/// Stores assets as flat files under a single directory so that the
/// static-file layer can map `/public/<name>` straight to `<base>/<name>`.
#[derive(Clone)]
pub struct DiskAssetBackend {
    base_path: PathBuf,
}

impl DiskAssetBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn asset_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Ensure the asset directory exists
    async fn ensure_dir(&self) -> ApiResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            ApiError::AssetStorage(format!("Failed to create asset directory: {}", e))
        })
    }
}

#[async_trait]
impl AssetBackend for DiskAssetBackend {
    async fn put(&self, name: &str, data: &[u8]) -> ApiResult<()> {
        self.ensure_dir().await?;

        fs::write(self.asset_path(name), data)
            .await
            .map_err(|e| ApiError::AssetStorage(format!("Failed to write asset {}: {}", name, e)))?;

        Ok(())
    }

    async fn delete(&self, name: &str) -> ApiResult<()> {
        match fs::remove_file(self.asset_path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::AssetStorage(format!(
                "Failed to delete asset {}: {}",
                name, e
            ))),
        }
    }

    async fn exists(&self, name: &str) -> ApiResult<bool> {
        Ok(self.asset_path(name).exists())
    }
}
