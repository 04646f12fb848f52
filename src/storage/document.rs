//! 影评记录与 BSON 文档之间的显式映射
//!
//! 文档结构: `{ "_id": <id>, "body": <body> }`。
//! 合法的 24 位小写十六进制标识符以 ObjectId 存储，其余字符串原样存储。

use bson::{oid::ObjectId, Bson, Document};

use crate::infrastructure::error::ReviewStoreError;
use crate::models::review::ReviewRecord;

pub const ID_FIELD: &str = "_id";
pub const BODY_FIELD: &str = "body";

/// 将标识符编码为 `_id` 的 BSON 值
pub fn encode_id(id: &str) -> Bson {
    match ObjectId::parse_str(id) {
        // 只接受能原样还原的写法，大写十六进制按普通字符串处理
        Ok(oid) if oid.to_hex() == id => Bson::ObjectId(oid),
        _ => Bson::String(id.to_string()),
    }
}

/// 将影评记录转换为文档，未分配标识符时不写 `_id`
pub fn to_document(record: &ReviewRecord) -> Document {
    let mut document = Document::new();
    if let Some(id) = record.review_id.as_deref() {
        document.insert(ID_FIELD, encode_id(id));
    }
    document.insert(BODY_FIELD, record.body.as_str());
    document
}

/// 从文档还原影评记录，忽略未知字段
pub fn from_document(document: &Document) -> Result<ReviewRecord, ReviewStoreError> {
    let review_id = match document.get(ID_FIELD) {
        None => None,
        Some(Bson::ObjectId(oid)) => Some(oid.to_hex()),
        Some(Bson::String(id)) => Some(id.clone()),
        Some(other) => {
            return Err(ReviewStoreError::mapping(
                ID_FIELD,
                format!("unsupported id type {:?}", other.element_type()),
            ))
        }
    };

    let body = document
        .get_str(BODY_FIELD)
        .map_err(|e| ReviewStoreError::mapping(BODY_FIELD, e.to_string()))?
        .to_string();

    Ok(ReviewRecord { body, review_id })
}

/// 按标识符查询的过滤条件
pub fn id_filter(id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(ID_FIELD, encode_id(id));
    filter
}
