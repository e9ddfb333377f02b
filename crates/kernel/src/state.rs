//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::file::{FileStorage, ImageUploadService, LocalFileStorage};
use crate::identity::{IdentityProvider, MemoryIdentityProvider, PgIdentityProvider};
use crate::services::{GeminiMenuGenerator, MenuGenerator, MenuPublishingService};
use crate::store::{MemoryMenuStore, MenuStore, PgMenuStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Menu reads, saves, and publishing.
    menus: MenuPublishingService,

    /// Owner accounts.
    identity: Arc<dyn IdentityProvider>,

    /// Photo uploads.
    uploads: ImageUploadService,

    /// AI auto-fill. `None` when no API key is configured.
    generator: Option<Arc<dyn MenuGenerator>>,
}

impl AppState {
    /// Create new application state, connecting to the configured backends.
    pub async fn new(config: &Config) -> Result<Self> {
        let (store, identity): (Arc<dyn MenuStore>, Arc<dyn IdentityProvider>) =
            if config.uses_memory_store() {
                info!("using in-memory store; data is lost on restart");
                (
                    Arc::new(MemoryMenuStore::new()),
                    Arc::new(MemoryIdentityProvider::new()),
                )
            } else {
                let pool = db::create_pool(config)
                    .await
                    .context("failed to create database pool")?;
                db::run_migrations(&pool).await?;
                info!("connected to PostgreSQL");
                (
                    Arc::new(PgMenuStore::new(pool.clone())),
                    Arc::new(PgIdentityProvider::new(pool)),
                )
            };

        let storage = create_file_storage(config).await?;
        info!(scheme = storage.scheme(), "file storage ready");

        let generator: Option<Arc<dyn MenuGenerator>> =
            config.gemini_api_key.as_ref().map(|key| {
                Arc::new(GeminiMenuGenerator::new(key.clone(), config.gemini_model.clone()))
                    as Arc<dyn MenuGenerator>
            });
        if generator.is_none() {
            info!("GEMINI_API_KEY not set; AI auto-fill disabled");
        }

        Ok(Self::from_parts(
            MenuPublishingService::new(store, config.site_url.clone()),
            identity,
            ImageUploadService::new(storage),
            generator,
        ))
    }

    /// Assemble state from already-built services.
    pub fn from_parts(
        menus: MenuPublishingService,
        identity: Arc<dyn IdentityProvider>,
        uploads: ImageUploadService,
        generator: Option<Arc<dyn MenuGenerator>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                menus,
                identity,
                uploads,
                generator,
            }),
        }
    }

    /// Get the menu publishing service.
    pub fn menus(&self) -> &MenuPublishingService {
        &self.inner.menus
    }

    /// Get the identity provider.
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.identity
    }

    /// Get the image upload service.
    pub fn uploads(&self) -> &ImageUploadService {
        &self.inner.uploads
    }

    /// Get the menu generator, if configured.
    pub fn generator(&self) -> Option<&Arc<dyn MenuGenerator>> {
        self.inner.generator.as_ref()
    }

    /// Check if the menu store is healthy.
    pub async fn store_healthy(&self) -> bool {
        self.inner.menus.store().health().await
    }
}

#[cfg(feature = "s3")]
async fn create_file_storage(config: &Config) -> Result<Arc<dyn FileStorage>> {
    use crate::file::S3FileStorage;

    let Some(bucket) = config.s3_bucket.clone() else {
        return Ok(local_file_storage(config));
    };
    let public_url = config
        .s3_public_url
        .clone()
        .unwrap_or_else(|| format!("https://{bucket}.s3.amazonaws.com"));

    let storage = S3FileStorage::connect(
        bucket,
        config.s3_prefix.clone(),
        public_url,
        config.s3_endpoint_url.as_deref(),
    )
    .await;
    Ok(Arc::new(storage))
}

#[cfg(not(feature = "s3"))]
async fn create_file_storage(config: &Config) -> Result<Arc<dyn FileStorage>> {
    if config.s3_bucket.is_some() {
        tracing::warn!("S3_BUCKET is set but the s3 feature is disabled; using local storage");
    }
    Ok(local_file_storage(config))
}

fn local_file_storage(config: &Config) -> Arc<dyn FileStorage> {
    Arc::new(LocalFileStorage::new(
        config.uploads_dir.clone(),
        config.files_url.clone(),
    ))
}
