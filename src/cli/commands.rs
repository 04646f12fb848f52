use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::infrastructure::error::ReviewStoreError;
use crate::models::review::ReviewRecord;
use crate::storage::manager::ReviewRepository;
use crate::storage::models::{ReviewFilter, SortOrder};
use super::args::Command;

/// 子命令的执行结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Review(ReviewRecord),
    Reviews(Vec<ReviewRecord>),
    Deleted { id: String, deleted: bool },
    Count { count: u64 },
    Health(BTreeMap<String, bool>),
}

impl CommandOutput {
    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(self)?);
        }

        let text = match self {
            CommandOutput::Review(review) => review.to_string(),
            CommandOutput::Reviews(reviews) if reviews.is_empty() => "没有找到影评".to_string(),
            CommandOutput::Reviews(reviews) => reviews
                .iter()
                .map(|review| review.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            CommandOutput::Deleted { id, deleted: true } => format!("已删除影评: {}", id),
            CommandOutput::Deleted { id, deleted: false } => format!("影评不存在: {}", id),
            CommandOutput::Count { count } => format!("影评总数: {}", count),
            CommandOutput::Health(health) => health
                .iter()
                .map(|(provider, healthy)| {
                    format!("{}: {}", provider, if *healthy { "ok" } else { "unavailable" })
                })
                .collect::<Vec<_>>()
                .join("\n"),
        };
        Ok(text)
    }

    /// 健康检查失败时用非零状态退出
    pub fn is_failure(&self) -> bool {
        match self {
            CommandOutput::Health(health) => health.is_empty() || health.values().any(|ok| !ok),
            _ => false,
        }
    }
}

/// 执行子命令
pub async fn execute(command: &Command, repository: &ReviewRepository) -> Result<CommandOutput> {
    let output = match command {
        Command::Add { body, id } => {
            let record = match id {
                Some(id) => ReviewRecord::with_id(body.as_str(), id.as_str()),
                None => ReviewRecord::new(body.as_str()),
            };
            CommandOutput::Review(repository.insert(record).await?)
        }
        Command::Get { id } => {
            let review = repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| ReviewStoreError::not_found(id.as_str()))?;
            CommandOutput::Review(review)
        }
        Command::List {
            contains,
            limit,
            offset,
            desc,
        } => {
            let filter = ReviewFilter {
                body_contains: contains.clone(),
                limit: *limit,
                offset: *offset,
                sort_order: Some(if *desc { SortOrder::Desc } else { SortOrder::Asc }),
            };
            CommandOutput::Reviews(repository.find_all(&filter).await?)
        }
        Command::Update { id, body } => {
            CommandOutput::Review(repository.update_body(id, body.as_str()).await?)
        }
        Command::Delete { id } => CommandOutput::Deleted {
            id: id.clone(),
            deleted: repository.delete_by_id(id).await?,
        },
        Command::Count => CommandOutput::Count {
            count: repository.count().await?,
        },
        Command::Health if !repository.is_enabled() => {
            return Err(ReviewStoreError::config("Storage is disabled, nothing to check").into());
        }
        Command::Health => CommandOutput::Health(
            repository
                .health_check()
                .await?
                .into_iter()
                .map(|(storage_type, healthy)| (storage_type.to_string(), healthy))
                .collect(),
        ),
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::providers::StorageConfig;

    async fn repository() -> ReviewRepository {
        ReviewRepository::connect(StorageConfig::memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_get_update_delete() {
        let repository = repository().await;

        let added = execute(
            &Command::Add {
                body: "Great movie!".to_string(),
                id: Some("abc123".to_string()),
            },
            &repository,
        )
        .await
        .unwrap();
        assert_eq!(added, CommandOutput::Review(ReviewRecord::with_id("Great movie!", "abc123")));

        let fetched = execute(&Command::Get { id: "abc123".to_string() }, &repository)
            .await
            .unwrap();
        assert_eq!(fetched.render(false).unwrap(), "Review(reviewId=abc123, body=\"Great movie!\")");

        let updated = execute(
            &Command::Update {
                id: "abc123".to_string(),
                body: "Even better the second time".to_string(),
            },
            &repository,
        )
        .await
        .unwrap();
        assert_eq!(
            updated,
            CommandOutput::Review(ReviewRecord::with_id("Even better the second time", "abc123"))
        );

        let deleted = execute(&Command::Delete { id: "abc123".to_string() }, &repository)
            .await
            .unwrap();
        assert_eq!(deleted.render(false).unwrap(), "已删除影评: abc123");

        let err = execute(&Command::Get { id: "abc123".to_string() }, &repository)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReviewStoreError>(),
            Some(ReviewStoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_and_count_render() {
        let repository = repository().await;
        for body in ["Great plot", "Dull", "great cast"] {
            execute(&Command::Add { body: body.to_string(), id: None }, &repository)
                .await
                .unwrap();
        }

        let listed = execute(
            &Command::List {
                contains: Some("great".to_string()),
                limit: None,
                offset: None,
                desc: true,
            },
            &repository,
        )
        .await
        .unwrap();
        match &listed {
            CommandOutput::Reviews(reviews) => {
                let bodies: Vec<_> = reviews.iter().map(|r| r.body()).collect();
                assert_eq!(bodies, vec!["great cast", "Great plot"]);
            }
            other => panic!("unexpected output: {:?}", other),
        }

        let json: serde_json::Value =
            serde_json::from_str(&listed.render(true).unwrap()).unwrap();
        assert_eq!(json.as_array().map(|a| a.len()), Some(2));
        assert!(json[0]["reviewId"].is_string());

        let count = execute(&Command::Count, &repository).await.unwrap();
        assert_eq!(count.render(false).unwrap(), "影评总数: 3");
        assert_eq!(count.render(true).unwrap(), "{\n  \"count\": 3\n}");
    }

    #[tokio::test]
    async fn test_health() {
        let repository = repository().await;
        let health = execute(&Command::Health, &repository).await.unwrap();
        assert_eq!(health.render(false).unwrap(), "memory: ok");
        assert!(!health.is_failure());
    }

    #[tokio::test]
    async fn test_health_with_storage_disabled() {
        let config = StorageConfig {
            enabled: false,
            ..StorageConfig::memory()
        };
        let repository = ReviewRepository::connect(config).await.unwrap();

        let err = execute(&Command::Health, &repository).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReviewStoreError>(),
            Some(ReviewStoreError::Configuration { .. })
        ));
    }
}
