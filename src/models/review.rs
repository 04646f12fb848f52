use serde::{Deserialize, Serialize};
use std::fmt;

/// 影评记录
///
/// `review_id` 为空表示尚未持久化，首次写入存储时由存储层分配。
/// 两个字段都可以自由读写，类型本身不做任何校验。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
}

impl ReviewRecord {
    /// 仅用正文创建，标识符留空
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            review_id: None,
        }
    }

    /// 用正文和标识符创建，通常用于从存储中重建记录
    pub fn with_id(body: impl Into<String>, review_id: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            review_id: Some(review_id.into()),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    pub fn review_id(&self) -> Option<&str> {
        self.review_id.as_deref()
    }

    pub fn set_review_id(&mut self, review_id: impl Into<String>) {
        self.review_id = Some(review_id.into());
    }

    /// 是否已经分配过标识符
    pub fn is_persisted(&self) -> bool {
        self.review_id.is_some()
    }
}

impl fmt::Display for ReviewRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Review(reviewId={}, body={:?})",
            self.review_id.as_deref().unwrap_or("unset"),
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_leaves_id_unset() {
        let review = ReviewRecord::new("Great movie!");

        assert_eq!(review.body(), "Great movie!");
        assert_eq!(review.review_id(), None);
        assert!(!review.is_persisted());
    }

    #[test]
    fn test_with_id_populates_both_fields() {
        let review = ReviewRecord::with_id("Great movie!", "abc123");

        assert_eq!(review.body(), "Great movie!");
        assert_eq!(review.review_id(), Some("abc123"));
        assert!(review.is_persisted());
    }

    #[test]
    fn test_empty_body_is_allowed() {
        let review = ReviewRecord::new("");
        assert_eq!(review.body, "");
    }

    #[test]
    fn test_mutation_is_observable() {
        let mut review = ReviewRecord::new("first");
        review.set_body("second");
        review.set_review_id("id-1");
        assert_eq!(review.body(), "second");
        assert_eq!(review.review_id(), Some("id-1"));

        review.set_review_id("id-2");
        assert_eq!(review.review_id(), Some("id-2"));

        review.body.push_str(" edit");
        assert_eq!(review.body(), "second edit");
    }

    #[test]
    fn test_structural_equality() {
        let a = ReviewRecord::with_id("Great movie!", "abc123");
        let b = ReviewRecord::with_id("Great movie!", "abc123");
        assert_eq!(a, b);

        assert_ne!(a, ReviewRecord::with_id("Great movie", "abc123"));
        assert_ne!(a, ReviewRecord::with_id("Great movie!", "abc124"));
        assert_ne!(a, ReviewRecord::new("Great movie!"));
        assert_eq!(ReviewRecord::new("x"), ReviewRecord::new("x"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ReviewRecord::new("Great movie!").to_string(),
            "Review(reviewId=unset, body=\"Great movie!\")"
        );
        assert_eq!(
            ReviewRecord::with_id("ok", "abc123").to_string(),
            "Review(reviewId=abc123, body=\"ok\")"
        );
    }

    #[test]
    fn test_json_uses_camel_case() {
        let review = ReviewRecord::with_id("Great movie!", "abc123");
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["body"], "Great movie!");
        assert_eq!(json["reviewId"], "abc123");

        let unsaved = serde_json::to_value(ReviewRecord::new("x")).unwrap();
        assert!(unsaved.get("reviewId").is_none());

        let parsed: ReviewRecord = serde_json::from_str(r#"{"body":"x"}"#).unwrap();
        assert_eq!(parsed, ReviewRecord::new("x"));
    }
}
