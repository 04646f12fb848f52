use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infrastructure::error::ReviewStoreError;
use crate::infrastructure::logging::LoggingConfig;
use crate::storage::providers::StorageConfig;

pub const ENV_PREFIX: &str = "MOVIE_REVIEWS_";

/// 应用程序配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 存储配置
    pub storage: StorageConfig,

    /// 日志配置
    pub logging: LoggingConfig,
}

/// 配置源，按添加顺序依次覆盖
#[derive(Debug, Clone)]
pub enum ConfigSource {
    Default,
    File(PathBuf),
    /// `.env` 文件，只填充尚未设置的环境变量
    EnvFile(PathBuf),
    Environment,
}

/// 配置管理器
pub struct ConfigManager {
    config: AppConfig,
    config_sources: Vec<ConfigSource>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_sources: vec![ConfigSource::Default],
        }
    }

    /// 标准的加载顺序: 默认值、配置文件、`~/.movie-reviews/.env`、`./.env`、环境变量
    pub fn standard(config_file: Option<PathBuf>) -> Self {
        let mut manager = Self::new();
        if let Some(path) = config_file {
            manager = manager.add_source(ConfigSource::File(path));
        }
        if let Ok(home) = std::env::var("HOME") {
            manager = manager.add_source(ConfigSource::EnvFile(
                PathBuf::from(home).join(".movie-reviews").join(".env"),
            ));
        }
        manager
            .add_source(ConfigSource::EnvFile(PathBuf::from(".env")))
            .add_source(ConfigSource::Environment)
    }

    /// 添加配置源
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.config_sources.push(source);
        self
    }

    /// 加载配置
    pub fn load(&mut self) -> Result<(), ReviewStoreError> {
        let mut config = AppConfig::default();

        for source in &self.config_sources {
            match source {
                ConfigSource::Default => {}
                ConfigSource::File(path) => {
                    if let Some(file_config) = load_from_file(path)? {
                        config = file_config;
                    }
                }
                ConfigSource::EnvFile(path) => {
                    if path.exists() {
                        dotenvy::from_path(path).ok();
                    }
                }
                ConfigSource::Environment => {
                    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
                }
            }
        }

        validate_config(&config)?;
        self.config = config;

        Ok(())
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 从文件加载配置，文件不存在时返回 `None`
pub fn load_from_file(path: &Path) -> Result<Option<AppConfig>, ReviewStoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ReviewStoreError::config(format!("无法读取配置文件 {}: {}", path.display(), e))
    })?;

    let file_config: AppConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content)
            .map_err(|e| ReviewStoreError::config(format!("TOML 解析错误: {}", e)))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .map_err(|e| ReviewStoreError::config(format!("YAML 解析错误: {}", e)))?,
        Some("json") => serde_json::from_str(&content)
            .map_err(|e| ReviewStoreError::config(format!("JSON 解析错误: {}", e)))?,
        _ => return Err(ReviewStoreError::config("不支持的配置文件格式")),
    };

    Ok(Some(file_config))
}

/// 用环境变量覆盖配置
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ReviewStoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    if let Some(enabled) = var("STORAGE_ENABLED") {
        config.storage.enabled = enabled.parse().map_err(|_| {
            ReviewStoreError::config(format!("无效的 STORAGE_ENABLED 值: {}", enabled))
        })?;
    }
    if let Some(provider) = var("STORAGE_PROVIDER") {
        config.storage.provider = provider
            .parse()
            .map_err(|e| ReviewStoreError::config(format!("{}", e)))?;
    }
    if let Some(uri) = var("MONGODB_URI") {
        config.storage.connection_string = uri;
    }
    if let Some(database) = var("DATABASE") {
        config.storage.database_name = database;
    }
    if let Some(collection) = var("COLLECTION") {
        config.storage.collection_name = collection;
    }
    if let Some(strategy) = var("ID_STRATEGY") {
        config.storage.id_strategy = strategy
            .parse()
            .map_err(|e| ReviewStoreError::config(format!("{}", e)))?;
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.logging.level = level;
    }

    Ok(())
}

/// 验证配置
pub fn validate_config(config: &AppConfig) -> Result<(), ReviewStoreError> {
    use crate::storage::providers::StorageType;

    if config.storage.database_name.trim().is_empty() {
        return Err(ReviewStoreError::validation(
            "数据库名称不能为空",
            Some("storage.database_name".to_string()),
        ));
    }

    if config.storage.collection_name.trim().is_empty() {
        return Err(ReviewStoreError::validation(
            "集合名称不能为空",
            Some("storage.collection_name".to_string()),
        ));
    }

    if config.storage.provider == StorageType::MongoDB {
        let uri = &config.storage.connection_string;
        if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
            return Err(ReviewStoreError::validation(
                format!("无效的 MongoDB 连接字符串: {}", uri),
                Some("storage.connection_string".to_string()),
            ));
        }
    }

    if config.storage.connection_timeout_seconds == 0 {
        return Err(ReviewStoreError::validation(
            "连接超时必须大于 0",
            Some("storage.connection_timeout_seconds".to_string()),
        ));
    }

    config
        .logging
        .level()
        .map_err(|e| ReviewStoreError::validation(e.to_string(), Some("logging.level".to_string())))?;

    Ok(())
}
