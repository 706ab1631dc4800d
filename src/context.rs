/// Application context and dependency injection
use crate::{
    asset_store::{AssetStore, DiskAssetBackend},
    config::ServerConfig,
    content::{AnimeStore, ArticleStore, ProjectStore},
    db,
    error::{ApiError, ApiResult},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
///
/// Constructed once at startup and cloned into every handler; there is no
/// ambient module-level database handle anywhere.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub assets: AssetStore,
    pub articles: ArticleStore,
    pub animes: AnimeStore,
    pub projects: ProjectStore,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Initialize database
        let pool = db::create_pool(&config.storage.database_path, db::DatabaseOptions::default())
            .await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        // Initialize asset store
        let backend = Arc::new(DiskAssetBackend::new(config.storage.asset_directory.clone()));
        let assets = AssetStore::new(backend, &config.service.public_base_url);

        Ok(Self {
            config: Arc::new(config),
            db: pool.clone(),
            assets,
            articles: ArticleStore::new(pool.clone()),
            animes: AnimeStore::new(pool.clone()),
            projects: ProjectStore::new(pool),
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ApiResult<()> {
        let dirs = [
            &config.storage.data_directory,
            &config.storage.asset_directory,
        ];

        for dir in dirs {
            if !dir.exists() {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    ApiError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
            }
        }

        Ok(())
    }

    /// Release pooled database connections
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
