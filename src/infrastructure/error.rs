use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 持久化边界上的错误类型
///
/// 存储层统一返回 `anyhow::Result`，内部包装本类型，
/// 调用方可以通过 `downcast_ref::<ReviewStoreError>()` 区分具体原因。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStoreError {
    #[error("配置错误: {message}")]
    Configuration { message: String },

    #[error("文档映射错误: {field} - {message}")]
    Mapping { field: String, message: String },

    #[error("影评不存在: {id}")]
    NotFound { id: String },

    #[error("影评标识符已存在: {id}")]
    DuplicateId { id: String },

    #[error("存储错误: {storage_type} - {message}")]
    Storage { storage_type: String, message: String },

    #[error("验证错误: {message}")]
    Validation { message: String, field: Option<String> },
}

impl ReviewStoreError {
    pub fn config(message: impl Into<String>) -> Self {
        ReviewStoreError::Configuration {
            message: message.into(),
        }
    }

    pub fn mapping(field: impl Into<String>, message: impl Into<String>) -> Self {
        ReviewStoreError::Mapping {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        ReviewStoreError::NotFound { id: id.into() }
    }

    pub fn duplicate_id(id: impl Into<String>) -> Self {
        ReviewStoreError::DuplicateId { id: id.into() }
    }

    pub fn storage(storage_type: impl Into<String>, message: impl Into<String>) -> Self {
        ReviewStoreError::Storage {
            storage_type: storage_type.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, field: Option<String>) -> Self {
        ReviewStoreError::Validation {
            message: message.into(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ReviewStoreError::mapping("body", "missing").to_string(),
            "文档映射错误: body - missing"
        );
        assert_eq!(ReviewStoreError::not_found("abc123").to_string(), "影评不存在: abc123");
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = ReviewStoreError::duplicate_id("abc").into();
        assert_eq!(
            err.downcast_ref::<ReviewStoreError>(),
            Some(&ReviewStoreError::duplicate_id("abc"))
        );
    }
}
