//! 请求消息：每个阶段向 LLM 发送的一组带角色的消息
//!
//! 起草阶段的修订轮次会追加 assistant（上一稿）与 user（评审）两条，其余阶段只有 system + user。

use serde::{Deserialize, Serialize};

/// 消息角色，序列化为小写以匹配 chat completion 接口
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// 上一轮草稿以 assistant 身份回放
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_deserialize_request_message() {
        let msg: Message = serde_json::from_str(r#"{"role":"system","content":"plan"}"#).unwrap();
        assert_eq!(msg, Message::system("plan"));
    }
}
