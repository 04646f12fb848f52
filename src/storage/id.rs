use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 首次持久化时分配标识符的策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// 24 位十六进制 ObjectId
    #[default]
    ObjectId,
    /// UUID v4
    Uuid,
}

impl IdStrategy {
    pub fn generate(&self) -> String {
        match self {
            IdStrategy::ObjectId => ObjectId::new().to_hex(),
            IdStrategy::Uuid => uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "objectid" | "object_id" => Ok(IdStrategy::ObjectId),
            "uuid" => Ok(IdStrategy::Uuid),
            other => Err(anyhow::anyhow!("Unknown id strategy: {}", other)),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::ObjectId => write!(f, "objectid"),
            IdStrategy::Uuid => write!(f, "uuid"),
        }
    }
}
