use serde::{Deserialize, Serialize};

pub const DEFAULT_LIST_LIMIT: usize = 50;

/// 影评列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFilter {
    /// 正文包含的子串，大小写不敏感
    pub body_contains: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_order: Option<SortOrder>,
}

/// 排序顺序
///
/// 内存存储按插入顺序，MongoDB 按 `_id` 排序。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl ReviewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_contains(mut self, needle: impl Into<String>) -> Self {
        self.body_contains = Some(needle.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// 判断正文是否满足过滤条件
    pub fn matches_body(&self, body: &str) -> bool {
        match &self.body_contains {
            Some(needle) => body.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
