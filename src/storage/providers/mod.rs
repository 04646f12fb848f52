use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::review::ReviewRecord;
use super::id::IdStrategy;
use super::models::ReviewFilter;

pub mod memory;

pub use memory::MemoryReviewStore;

#[cfg(feature = "storage-mongodb")]
pub mod mongodb;

#[cfg(feature = "storage-mongodb")]
pub use mongodb::MongoReviewStore;

/// 存储类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    MongoDB,
    Memory,
}

impl FromStr for StorageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StorageType::MongoDB),
            "memory" | "mem" => Ok(StorageType::Memory),
            other => Err(anyhow::anyhow!("Unknown storage provider: {}", other)),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::MongoDB => write!(f, "mongodb"),
            StorageType::Memory => write!(f, "memory"),
        }
    }
}

/// 影评存储提供商 trait
///
/// 错误以 `anyhow::Error` 返回，业务相关的情况包装为
/// [`ReviewStoreError`](crate::infrastructure::error::ReviewStoreError)。
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// 获取存储类型
    fn storage_type(&self) -> StorageType;

    /// 插入新影评，未设置标识符时自动分配；标识符已存在时返回 `DuplicateId`
    async fn insert(&mut self, record: ReviewRecord) -> Result<ReviewRecord>;

    /// 保存影评，标识符已设置时覆盖或创建
    async fn save(&mut self, record: ReviewRecord) -> Result<ReviewRecord>;

    /// 按标识符检索
    async fn find_by_id(&self, id: &str) -> Result<Option<ReviewRecord>>;

    /// 列出影评
    async fn find_all(&self, filter: &ReviewFilter) -> Result<Vec<ReviewRecord>>;

    /// 删除影评，返回是否确实删除了记录
    async fn delete_by_id(&mut self, id: &str) -> Result<bool>;

    /// 影评总数
    async fn count(&self) -> Result<u64>;

    /// 检查存储是否可用
    fn is_available(&self) -> bool;

    /// 健康检查
    async fn health_check(&self) -> Result<bool>;
}

/// 存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub enabled: bool,
    pub provider: StorageType,
    pub connection_string: String,
    pub database_name: String,
    pub collection_name: String,
    pub id_strategy: IdStrategy,
    pub connection_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: StorageType::MongoDB,
            connection_string: "mongodb://localhost:27017".to_string(),
            database_name: "movies".to_string(),
            collection_name: "reviews".to_string(),
            id_strategy: IdStrategy::ObjectId,
            connection_timeout_seconds: 10,
        }
    }
}

impl StorageConfig {
    /// 内存存储配置，主要用于测试
    pub fn memory() -> Self {
        Self {
            provider: StorageType::Memory,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_parse_and_display() {
        assert_eq!("MongoDB".parse::<StorageType>().unwrap(), StorageType::MongoDB);
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert!("sqlite".parse::<StorageType>().is_err());
        assert_eq!(StorageType::MongoDB.to_string(), "mongodb");
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert!(config.enabled);
        assert_eq!(config.provider, StorageType::MongoDB);
        assert_eq!(config.collection_name, "reviews");
        assert_eq!(config.id_strategy, IdStrategy::ObjectId);
        assert_eq!(StorageConfig::memory().provider, StorageType::Memory);
    }
}
