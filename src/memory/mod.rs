//! 记忆层：对话消息、token 计数与预算、消息日志持久化

pub mod conversation;
pub mod persistence;
pub mod token_budget;

pub use conversation::{Message, Role};
pub use persistence::{InMemoryMessageLog, JsonMessageLog, MessageLog, MessageLogEntry};
pub use token_budget::{TokenBudget, TokenCounter, TokenEstimator, DEFAULT_TOKEN_BUDGET};
