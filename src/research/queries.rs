//! 查询生成与检索策略
//!
//! QueryGenerator 是结构化输出能力接口；LlmQueryGenerator 通过 LlmClient::complete_json 实现它。
//! SearchPolicy 决定每个阶段的查询数与每条查询的结果数（有已验证来源时收窄检索）。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::llm::{LlmClient, LlmError};
use crate::memory::Message;
use crate::tools::{queries_schema, QUERIES_SCHEMA_NAME};

/// 结构化查询生成能力：返回至多 max_queries 条查询，保持模型给出的顺序
#[async_trait]
pub trait QueryGenerator: Send + Sync {
    async fn generate_queries(
        &self,
        instructions: &str,
        seed_text: &str,
        max_queries: usize,
    ) -> Result<Vec<String>, LlmError>;
}

/// 模型可能返回对象或裸数组
#[derive(Deserialize)]
#[serde(untagged)]
enum QueriesPayload {
    Object { queries: Vec<String> },
    List(Vec<String>),
}

/// 从模型输出中提取查询列表：支持 ```json 代码块、对象 `{"queries": [...]}` 与裸数组
///
/// 先按 `{`..最后一个 `}` 解析对象，失败再按 `[`..最后一个 `]` 解析数组。
pub fn parse_queries(output: &str) -> Result<Vec<String>, LlmError> {
    let trimmed = output.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        let block = rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim());
        return decode_payload(block);
    }

    let object = span(trimmed, '{', '}');
    let array = span(trimmed, '[', ']');
    let mut last_err = None;
    for candidate in [object, array].into_iter().flatten() {
        match decode_payload(candidate) {
            Ok(queries) => return Ok(queries),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        LlmError::InvalidStructuredOutput(format!("no JSON in output: {}", trimmed))
    }))
}

/// 首个 open 到最后一个 close（含）之间的片段
fn span(text: &str, open: char, close: char) -> Option<&str> {
    match (text.find(open), text.rfind(close)) {
        (Some(s), Some(e)) if s < e => Some(&text[s..=e]),
        _ => None,
    }
}

fn decode_payload(json_str: &str) -> Result<Vec<String>, LlmError> {
    let payload: QueriesPayload = serde_json::from_str(json_str)
        .map_err(|e| LlmError::InvalidStructuredOutput(format!("{}: {}", e, json_str)))?;
    match payload {
        QueriesPayload::Object { queries } | QueriesPayload::List(queries) => Ok(queries),
    }
}

/// 清洗：去空白、去空串，截断到上限，顺序不变
fn normalize(queries: Vec<String>, max_queries: usize) -> Vec<String> {
    queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(max_queries)
        .collect()
}

/// 基于 LLM 结构化输出的查询生成器
pub struct LlmQueryGenerator {
    llm: Arc<dyn LlmClient>,
}

impl LlmQueryGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QueryGenerator for LlmQueryGenerator {
    async fn generate_queries(
        &self,
        instructions: &str,
        seed_text: &str,
        max_queries: usize,
    ) -> Result<Vec<String>, LlmError> {
        if max_queries == 0 {
            return Ok(Vec::new());
        }
        let messages = vec![Message::system(instructions), Message::user(seed_text)];
        let raw = self
            .llm
            .complete_json(&messages, QUERIES_SCHEMA_NAME, &queries_schema())
            .await?;
        Ok(normalize(parse_queries(&raw)?, max_queries))
    }
}

/// 查询生成所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// 依据任务检索（ResearchPlanning）
    Planning,
    /// 依据评审意见检索（ResearchCritique）
    Critique,
}

/// 单个策略格：查询数 × 每条查询结果数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_queries: usize,
    pub results_per_query: usize,
}

impl SearchLimits {
    pub const fn new(max_queries: usize, results_per_query: usize) -> Self {
        Self {
            max_queries,
            results_per_query,
        }
    }
}

/// 检索策略表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPolicy {
    pub planning: SearchLimits,
    pub planning_verified: SearchLimits,
    pub critique: SearchLimits,
    pub critique_verified: SearchLimits,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            planning: SearchLimits::new(3, 2),
            planning_verified: SearchLimits::new(2, 1),
            critique: SearchLimits::new(3, 2),
            critique_verified: SearchLimits::new(3, 1),
        }
    }
}

impl SearchPolicy {
    pub fn for_stage(&self, stage: QueryStage, has_verified: bool) -> SearchLimits {
        match (stage, has_verified) {
            (QueryStage::Planning, false) => self.planning,
            (QueryStage::Planning, true) => self.planning_verified,
            (QueryStage::Critique, false) => self.critique,
            (QueryStage::Critique, true) => self.critique_verified,
        }
    }
}
