//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：complete（自由文本）、complete_json（结构化输出）。

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::Message;

/// LLM 调用错误：请求失败、空回复、结构化输出无法解析
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("Invalid structured output: {0}")]
    InvalidStructuredOutput(String),
}

/// LLM 客户端 trait：需可被多个独立 run 并发共享（无状态请求/响应）
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回自由文本
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 结构化完成：要求模型按 JSON Schema 输出，返回原始 JSON 文本
    ///
    /// 默认实现把 Schema 追加为一条 system 指令后走 complete；支持 response_format 的后端可覆盖。
    async fn complete_json(
        &self,
        messages: &[Message],
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        let mut full = messages.to_vec();
        full.push(Message::system(format!(
            "Respond with a single JSON object named `{}` that matches this JSON Schema, and nothing else:\n{}",
            schema_name,
            serde_json::to_string_pretty(schema).unwrap_or_default()
        )));
        self.complete(&full).await
    }

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// 记录收到的消息，用于校验默认 complete_json 的拼接
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl LlmClient for Recording {
        async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            Ok("{}".to_string())
        }
    }

    #[tokio::test]
    async fn test_default_complete_json_appends_schema() {
        let client = Recording::default();
        let schema = serde_json::json!({"type": "object"});
        let out = client
            .complete_json(&[Message::user("hi")], "Queries", &schema)
            .await
            .unwrap();
        assert_eq!(out, "{}");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].content.contains("Queries"));
        assert!(seen[1].content.contains("\"object\""));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LlmError::Request("timeout".into()).to_string(),
            "LLM request failed: timeout"
        );
    }
}
