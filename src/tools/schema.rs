//! 结构化输出 JSON Schema 生成（schemars）
//!
//! 查询生成要求模型返回 `{"queries": ["...", ...]}`，Schema 交给支持 response_format 的后端，
//! 或由默认实现拼入提示词。

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// 搜索查询列表（结构化输出格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Queries {
    /// 按优先级排列的搜索查询
    pub queries: Vec<String>,
}

/// Schema 名称（response_format.json_schema.name）
pub const QUERIES_SCHEMA_NAME: &str = "Queries";

/// 返回 Queries 的 JSON Schema
pub fn queries_schema() -> serde_json::Value {
    serde_json::to_value(schema_for!(Queries)).unwrap_or_else(|_| serde_json::json!({}))
}
