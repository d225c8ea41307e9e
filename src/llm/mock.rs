//! Mock LLM 客户端（用于本地试跑与测试，无需 API）
//!
//! 自由文本请求回显最后一条 User 消息；结构化请求返回以该消息为唯一查询的 `{"queries": [...]}`。
//! 输出只依赖输入，同样的消息总得到同样的结果。

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError};
use crate::memory::{Message, Role};

/// 回显内容的最大字符数
const ECHO_CHARS: usize = 120;

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

fn last_user(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("(no input)")
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let echo: String = last_user(messages).chars().take(ECHO_CHARS).collect();
        Ok(format!("Mock response to: {}", echo))
    }

    async fn complete_json(
        &self,
        messages: &[Message],
        _schema_name: &str,
        _schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        let query: String = last_user(messages)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(ECHO_CHARS)
            .collect();
        Ok(serde_json::json!({ "queries": [query] }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_last_user() {
        let out = MockLlmClient
            .complete(&[Message::system("sys"), Message::user("Write about bees")])
            .await
            .unwrap();
        assert_eq!(out, "Mock response to: Write about bees");
    }

    #[tokio::test]
    async fn test_mock_structured_output_is_queries_json() {
        let out = MockLlmClient
            .complete_json(&[Message::user("solar  power\ncosts")], "Queries", &serde_json::json!({}))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["queries"][0], "solar power costs");
    }
}
