use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::infrastructure::error::ReviewStoreError;
use crate::models::review::ReviewRecord;
use super::models::ReviewFilter;
use super::providers::{MemoryReviewStore, ReviewStore, StorageConfig, StorageType};

type SharedStore = Arc<RwLock<Box<dyn ReviewStore>>>;

/// 影评仓库，负责把调用路由到当前活跃的存储提供商
pub struct ReviewRepository {
    providers: HashMap<StorageType, SharedStore>,
    config: StorageConfig,
    active_provider: Option<StorageType>,
}

impl ReviewRepository {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            providers: HashMap::new(),
            active_provider: if config.enabled { Some(config.provider) } else { None },
            config,
        }
    }

    /// 按配置创建并注册对应的存储提供商
    pub async fn connect(config: StorageConfig) -> Result<Self> {
        let mut repository = Self::new(config.clone());
        if !config.enabled {
            warn!("Storage is disabled, no provider registered");
            return Ok(repository);
        }

        let provider: Box<dyn ReviewStore> = match config.provider {
            StorageType::Memory => Box::new(MemoryReviewStore::new(config.id_strategy)),
            #[cfg(feature = "storage-mongodb")]
            StorageType::MongoDB => {
                Box::new(super::providers::MongoReviewStore::from_config(&config).await?)
            }
            #[cfg(not(feature = "storage-mongodb"))]
            StorageType::MongoDB => {
                return Err(ReviewStoreError::config(
                    "MongoDB support was not compiled in (enable the `storage-mongodb` feature)",
                )
                .into());
            }
        };

        repository.register_provider(provider)?;
        Ok(repository)
    }

    /// 注册存储提供商
    pub fn register_provider(&mut self, provider: Box<dyn ReviewStore>) -> Result<()> {
        let storage_type = provider.storage_type();

        if !provider.is_available() {
            warn!("Storage provider {:?} is not available", storage_type);
            return Err(ReviewStoreError::storage(
                storage_type.to_string(),
                "provider is not available",
            )
            .into());
        }

        info!("Registering storage provider: {:?}", storage_type);
        self.providers.insert(storage_type, Arc::new(RwLock::new(provider)));

        Ok(())
    }

    fn active(&self) -> Result<SharedStore> {
        if !self.config.enabled {
            return Err(ReviewStoreError::config("Storage is disabled").into());
        }

        let provider_type = self
            .active_provider
            .ok_or_else(|| ReviewStoreError::config("No active storage provider configured"))?;

        self.providers.get(&provider_type).cloned().ok_or_else(|| {
            ReviewStoreError::config(format!("Storage provider {:?} not registered", provider_type))
                .into()
        })
    }

    /// 用正文创建新影评，标识符由存储层分配
    pub async fn create(&self, body: impl Into<String>) -> Result<ReviewRecord> {
        self.insert(ReviewRecord::new(body)).await
    }

    pub async fn insert(&self, record: ReviewRecord) -> Result<ReviewRecord> {
        let provider = self.active()?;
        let mut provider_guard = provider.write().await;

        match provider_guard.insert(record).await {
            Ok(stored) => {
                info!("Created review {}", stored.review_id().unwrap_or_default());
                Ok(stored)
            }
            Err(e) => {
                error!("Failed to create review: {}", e);
                Err(e)
            }
        }
    }

    pub async fn save(&self, record: ReviewRecord) -> Result<ReviewRecord> {
        let provider = self.active()?;
        let mut provider_guard = provider.write().await;

        match provider_guard.save(record).await {
            Ok(stored) => {
                info!("Saved review {}", stored.review_id().unwrap_or_default());
                Ok(stored)
            }
            Err(e) => {
                error!("Failed to save review: {}", e);
                Err(e)
            }
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ReviewRecord>> {
        let provider = self.active()?;
        let provider_guard = provider.read().await;

        debug!("Retrieving review with ID: {}", id);

        match provider_guard.find_by_id(id).await {
            Ok(record) => {
                if record.is_none() {
                    warn!("Review with ID {} not found", id);
                }
                Ok(record)
            }
            Err(e) => {
                error!("Failed to retrieve review {}: {}", id, e);
                Err(e)
            }
        }
    }

    pub async fn find_all(&self, filter: &ReviewFilter) -> Result<Vec<ReviewRecord>> {
        let provider = self.active()?;
        let provider_guard = provider.read().await;

        debug!("Listing reviews with filter: {:?}", filter);

        match provider_guard.find_all(filter).await {
            Ok(reviews) => {
                info!("Listed {} reviews", reviews.len());
                Ok(reviews)
            }
            Err(e) => {
                error!("Failed to list reviews: {}", e);
                Err(e)
            }
        }
    }

    /// 修改已有影评的正文，影评不存在时返回 `NotFound`
    pub async fn update_body(&self, id: &str, body: impl Into<String>) -> Result<ReviewRecord> {
        let provider = self.active()?;
        let mut provider_guard = provider.write().await;

        let mut record = provider_guard
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReviewStoreError::not_found(id))?;
        record.set_body(body);

        let saved = provider_guard.save(record).await?;
        info!("Updated review {}", id);
        Ok(saved)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let provider = self.active()?;
        let mut provider_guard = provider.write().await;

        match provider_guard.delete_by_id(id).await {
            Ok(deleted) => {
                if deleted {
                    info!("Deleted review {}", id);
                } else {
                    warn!("Review with ID {} not found, nothing deleted", id);
                }
                Ok(deleted)
            }
            Err(e) => {
                error!("Failed to delete review {}: {}", id, e);
                Err(e)
            }
        }
    }

    pub async fn count(&self) -> Result<u64> {
        let provider = self.active()?;
        let provider_guard = provider.read().await;
        provider_guard.count().await
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<HashMap<StorageType, bool>> {
        let mut results = HashMap::new();

        for (storage_type, provider) in &self.providers {
            let provider_guard = provider.read().await;
            match provider_guard.health_check().await {
                Ok(healthy) => {
                    results.insert(*storage_type, healthy);
                }
                Err(e) => {
                    error!("Health check failed for {:?}: {}", storage_type, e);
                    results.insert(*storage_type, false);
                }
            }
        }

        Ok(results)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && self.active_provider.is_some()
    }
}
