//! 搜索执行器：按查询返回排序后的文本片段
//!
//! SearchProvider 为外部协作方接口；TavilySearch 为默认实现（POST /search，Bearer 鉴权）。
//! 搜索失败对 run 不致命：search_or_empty 记录告警并以空结果替代。
//! 单个片段超过 max_snippet_chars 时截断并追加 ...[truncated]。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tavily 搜索端点
pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// 搜索提供方错误
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(String),

    #[error("Search provider returned HTTP {0}")]
    Status(u16),

    #[error("Malformed search response: {0}")]
    Decode(String),
}

/// 搜索提供方：(query, max_results) -> 排序后的文本片段
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, SearchError>;
}

/// 调用方包装：失败时返回空列表并告警，run 继续
pub async fn search_or_empty(
    provider: &dyn SearchProvider,
    query: &str,
    max_results: usize,
) -> Vec<String> {
    match provider.search(query, max_results).await {
        Ok(mut results) => {
            results.truncate(max_results);
            results
        }
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "search unavailable, continuing with no results");
            Vec::new()
        }
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    content: String,
}

/// 截断过长片段（按字符计）
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "\n...[truncated]"
    } else {
        text.to_string()
    }
}

/// Tavily 搜索：持有 reqwest Client、API Key 与片段长度上限；Client 可跨 run 共享
pub struct TavilySearch {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    max_snippet_chars: usize,
}

impl TavilySearch {
    /// HTTP 客户端构建失败时返回错误，不退回无超时的默认客户端
    pub fn new(
        api_key: impl Into<String>,
        timeout_secs: u64,
        max_snippet_chars: usize,
    ) -> Result<Self, SearchError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Request(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: TAVILY_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout,
            max_snippet_chars,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 覆盖端点（自建代理或测试服务器）
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, SearchError> {
        tracing::info!(query = %query, max_results, "tavily search");
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&TavilyRequest {
                query,
                max_results,
                search_depth: "basic",
            })
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }

        let body: TavilyResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .filter(|r| !r.content.trim().is_empty())
            .take(max_results)
            .map(|r| truncate_snippet(r.content.trim(), self.max_snippet_chars))
            .collect())
    }
}

/// 未配置搜索时使用：总是返回空结果
#[derive(Debug, Default)]
pub struct NoopSearch;

#[async_trait]
impl SearchProvider for NoopSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<String>, SearchError> {
        Ok(Vec::new())
    }
}
