use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::infrastructure::error::ReviewStoreError;
use crate::models::review::ReviewRecord;
use crate::storage::id::IdStrategy;
use crate::storage::models::{ReviewFilter, SortOrder};
use super::{ReviewStore, StorageType};

/// 内存存储提供商，按插入顺序保存影评
#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    records: HashMap<String, ReviewRecord>,
    order: Vec<String>,
    id_strategy: IdStrategy,
}

impl MemoryReviewStore {
    pub fn new(id_strategy: IdStrategy) -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            id_strategy,
        }
    }

    fn put(&mut self, id: String, record: ReviewRecord) {
        if self.records.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }

    async fn insert(&mut self, mut record: ReviewRecord) -> Result<ReviewRecord> {
        let id = match record.review_id.clone() {
            Some(id) if self.records.contains_key(&id) => {
                return Err(ReviewStoreError::duplicate_id(id).into());
            }
            Some(id) => id,
            None => {
                let id = self.id_strategy.generate();
                record.review_id = Some(id.clone());
                id
            }
        };

        self.put(id.clone(), record.clone());
        debug!("Stored review with ID: {}", id);
        Ok(record)
    }

    async fn save(&mut self, record: ReviewRecord) -> Result<ReviewRecord> {
        match record.review_id.clone() {
            Some(id) => {
                self.put(id.clone(), record.clone());
                debug!("Saved review with ID: {}", id);
                Ok(record)
            }
            None => self.insert(record).await,
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ReviewRecord>> {
        Ok(self.records.get(id).cloned())
    }

    async fn find_all(&self, filter: &ReviewFilter) -> Result<Vec<ReviewRecord>> {
        let matching = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| filter.matches_body(&record.body));

        let ordered: Vec<&ReviewRecord> = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => matching.collect(),
            SortOrder::Desc => matching.rev().collect(),
        };

        let reviews: Vec<ReviewRecord> = ordered
            .into_iter()
            .skip(filter.effective_offset())
            .take(filter.effective_limit())
            .cloned()
            .collect();

        debug!("Listed {} reviews from memory", reviews.len());
        Ok(reviews)
    }

    async fn delete_by_id(&mut self, id: &str) -> Result<bool> {
        if self.records.remove(id).is_some() {
            self.order.retain(|existing| existing != id);
            debug!("Deleted review with ID: {}", id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downcast(err: &anyhow::Error) -> Option<&ReviewStoreError> {
        err.downcast_ref::<ReviewStoreError>()
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let mut store = MemoryReviewStore::default();

        let stored = store.insert(ReviewRecord::new("Great movie!")).await.unwrap();
        let id = stored.review_id.clone().expect("id should be assigned");
        assert_eq!(id.len(), 24);
        assert_eq!(stored.body, "Great movie!");

        let found = store.find_by_id(&id).await.unwrap();
        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn test_insert_keeps_explicit_id() {
        let mut store = MemoryReviewStore::new(IdStrategy::Uuid);
        let stored = store
            .insert(ReviewRecord::with_id("Great movie!", "abc123"))
            .await
            .unwrap();
        assert_eq!(stored.review_id(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let mut store = MemoryReviewStore::default();
        store.insert(ReviewRecord::with_id("one", "abc")).await.unwrap();

        let err = store
            .insert(ReviewRecord::with_id("two", "abc"))
            .await
            .unwrap_err();
        assert_eq!(downcast(&err), Some(&ReviewStoreError::duplicate_id("abc")));

        let kept = store.find_by_id("abc").await.unwrap().unwrap();
        assert_eq!(kept.body, "one");
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let mut store = MemoryReviewStore::default();
        store.save(ReviewRecord::with_id("one", "abc")).await.unwrap();
        store.save(ReviewRecord::with_id("two", "abc")).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.find_by_id("abc").await.unwrap().unwrap().body, "two");

        let fresh = store.save(ReviewRecord::new("three")).await.unwrap();
        assert!(fresh.is_persisted());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let mut store = MemoryReviewStore::default();
        store.insert(ReviewRecord::with_id("one", "a")).await.unwrap();

        assert!(store.delete_by_id("a").await.unwrap());
        assert!(!store.delete_by_id("a").await.unwrap());
        assert!(store.find_by_id("a").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_all_filters_and_pages() {
        let mut store = MemoryReviewStore::default();
        for (id, body) in [("1", "Great plot"), ("2", "boring"), ("3", "great cast"), ("4", "GREAT score")] {
            store.insert(ReviewRecord::with_id(body, id)).await.unwrap();
        }

        let all = store.find_all(&ReviewFilter::new()).await.unwrap();
        let ids: Vec<_> = all.iter().filter_map(|r| r.review_id()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);

        let great = store
            .find_all(&ReviewFilter::new().body_contains("great"))
            .await
            .unwrap();
        assert_eq!(great.len(), 3);

        let page = store
            .find_all(&ReviewFilter::new().body_contains("great").offset(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page, vec![ReviewRecord::with_id("great cast", "3")]);

        let newest = store
            .find_all(&ReviewFilter::new().sort_order(SortOrder::Desc).limit(2))
            .await
            .unwrap();
        let ids: Vec<_> = newest.iter().filter_map(|r| r.review_id()).collect();
        assert_eq!(ids, vec!["4", "3"]);

        let none = store.find_all(&ReviewFilter::new().limit(0)).await.unwrap();
        assert!(none.is_empty());
    }
}
