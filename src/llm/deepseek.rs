//! DeepSeek API 客户端（OpenAI 兼容格式）
//!
//! - Base URL: https://api.deepseek.com
//! - 默认模型: deepseek-chat，可用配置 llm.deepseek.model 或 DEEPSEEK_MODEL 替换
//!
//! DeepSeek 不支持 json_schema 类型的 response_format，因此包一层，结构化输出走提示词约束。

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, OpenAiClient};
use crate::memory::Message;

/// DeepSeek API 常量
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// DeepSeek 客户端：复用 OpenAiClient 的请求逻辑，complete_json 使用 trait 默认实现
pub struct DeepSeekClient {
    inner: OpenAiClient,
}

#[async_trait]
impl LlmClient for DeepSeekClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.inner.complete(messages).await
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.inner.token_usage()
    }
}

/// 创建 DeepSeek 客户端
///
/// - 优先使用环境变量 `DEEPSEEK_API_KEY`
/// - 模型可通过 `model` 参数或 `DEEPSEEK_MODEL` 环境变量指定
pub fn create_deepseek_client(model: Option<&str>) -> DeepSeekClient {
    let api_key = std::env::var("DEEPSEEK_API_KEY")
        .ok()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_else(|| "sk-placeholder".to_string());

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    DeepSeekClient {
        inner: OpenAiClient::new(Some(DEEPSEEK_BASE_URL), &model, Some(api_key.as_str())),
    }
}
