use anyhow::Result;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{ClientOptions, FindOptions, ReplaceOptions},
    Client, Collection, Database,
};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::infrastructure::error::ReviewStoreError;
use crate::models::review::ReviewRecord;
use crate::storage::document::{from_document, id_filter, to_document, BODY_FIELD, ID_FIELD};
use crate::storage::id::IdStrategy;
use crate::storage::models::{ReviewFilter, SortOrder};
use super::{ReviewStore, StorageConfig, StorageType};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB 存储提供商
pub struct MongoReviewStore {
    database: Database,
    collection: Collection<Document>,
    collection_name: String,
    id_strategy: IdStrategy,
}

impl MongoReviewStore {
    /// 创建新的 MongoDB 提供商
    pub async fn new(
        connection_string: &str,
        database_name: &str,
        collection_name: String,
        id_strategy: IdStrategy,
        connection_timeout: Duration,
    ) -> Result<Self> {
        let mut client_options = ClientOptions::parse(connection_string).await?;
        client_options.app_name = Some("movie-reviews".to_string());
        client_options.connect_timeout = Some(connection_timeout);
        client_options.server_selection_timeout = Some(connection_timeout);
        let client = Client::with_options(client_options)?;

        let database = client.database(database_name);
        let collection = database.collection::<Document>(&collection_name);

        info!(
            "MongoDB store ready for '{}.{}'",
            database_name, collection_name
        );

        Ok(Self {
            database,
            collection,
            collection_name,
            id_strategy,
        })
    }

    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::new(
            &config.connection_string,
            &config.database_name,
            config.collection_name.clone(),
            config.id_strategy,
            Duration::from_secs(config.connection_timeout_seconds),
        )
        .await
    }

    /// 构建 MongoDB 查询过滤器
    fn build_filter(filter: &ReviewFilter) -> Document {
        match &filter.body_contains {
            Some(needle) => doc! {
                BODY_FIELD: { "$regex": regex::escape(needle), "$options": "i" }
            },
            None => Document::new(),
        }
    }

    fn build_sort(filter: &ReviewFilter) -> Document {
        let order = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        doc! { ID_FIELD: order }
    }

    /// limit 为 0 时返回 `None`，驱动会把 0 当作不限制
    fn build_find_options(filter: &ReviewFilter) -> Option<FindOptions> {
        let limit = filter.effective_limit();
        if limit == 0 {
            return None;
        }

        let options = FindOptions::builder()
            .sort(Self::build_sort(filter))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .skip(u64::try_from(filter.effective_offset()).unwrap_or(u64::MAX))
            .build();
        Some(options)
    }

    fn storage_error(action: &str, e: MongoError) -> anyhow::Error {
        error!("Failed to {} in MongoDB: {}", action, e);
        ReviewStoreError::storage("MongoDB", format!("failed to {}: {}", action, e)).into()
    }
}

fn is_duplicate_key(e: &MongoError) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl ReviewStore for MongoReviewStore {
    fn storage_type(&self) -> StorageType {
        StorageType::MongoDB
    }

    async fn insert(&mut self, mut record: ReviewRecord) -> Result<ReviewRecord> {
        if record.review_id.is_none() {
            record.review_id = Some(self.id_strategy.generate());
        }
        let id = record.review_id.clone().unwrap_or_default();
        let document = to_document(&record);

        match self.collection.insert_one(document, None).await {
            Ok(_) => {
                debug!("Stored review with ID: {}", id);
                Ok(record)
            }
            Err(e) if is_duplicate_key(&e) => Err(ReviewStoreError::duplicate_id(id).into()),
            Err(e) => Err(Self::storage_error("store review", e)),
        }
    }

    async fn save(&mut self, record: ReviewRecord) -> Result<ReviewRecord> {
        let Some(id) = record.review_id.clone() else {
            return self.insert(record).await;
        };

        let options = ReplaceOptions::builder().upsert(true).build();
        match self
            .collection
            .replace_one(id_filter(&id), to_document(&record), options)
            .await
        {
            Ok(result) => {
                debug!(
                    "Saved review with ID: {} (matched {}, upserted {})",
                    id,
                    result.matched_count,
                    result.upserted_id.is_some()
                );
                Ok(record)
            }
            Err(e) => Err(Self::storage_error("save review", e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ReviewRecord>> {
        match self.collection.find_one(id_filter(id), None).await {
            Ok(Some(document)) => {
                let record = from_document(&document)?;
                debug!("Retrieved review with ID: {}", id);
                Ok(Some(record))
            }
            Ok(None) => {
                debug!("Review with ID {} not found", id);
                Ok(None)
            }
            Err(e) => Err(Self::storage_error("retrieve review", e)),
        }
    }

    async fn find_all(&self, filter: &ReviewFilter) -> Result<Vec<ReviewRecord>> {
        let Some(find_options) = Self::build_find_options(filter) else {
            debug!("Listing with limit 0, skipping query");
            return Ok(Vec::new());
        };

        let mut cursor = self
            .collection
            .find(Self::build_filter(filter), find_options)
            .await
            .map_err(|e| Self::storage_error("list reviews", e))?;

        let mut reviews = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| Self::storage_error("read review cursor", e))?
        {
            match from_document(&document) {
                Ok(record) => reviews.push(record),
                Err(e) => {
                    error!("Skipping malformed review document: {}", e);
                    continue;
                }
            }
        }

        debug!(
            "Listed {} reviews from MongoDB collection '{}'",
            reviews.len(),
            self.collection_name
        );
        Ok(reviews)
    }

    async fn delete_by_id(&mut self, id: &str) -> Result<bool> {
        match self.collection.delete_one(id_filter(id), None).await {
            Ok(result) => {
                debug!("Deleted {} review(s) with ID: {}", result.deleted_count, id);
                Ok(result.deleted_count > 0)
            }
            Err(e) => Err(Self::storage_error("delete review", e)),
        }
    }

    async fn count(&self) -> Result<u64> {
        self.collection
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| Self::storage_error("count reviews", e))
    }

    fn is_available(&self) -> bool {
        // 连接是惰性建立的，真正的检查放在 health_check
        true
    }

    async fn health_check(&self) -> Result<bool> {
        match self.database.run_command(doc! { "ping": 1 }, None).await {
            Ok(_) => {
                debug!("MongoDB health check passed");
                Ok(true)
            }
            Err(e) => {
                error!("MongoDB health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
