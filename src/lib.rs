//! Scribe - 迭代式研究写作 Agent
//!
//! 模块划分：
//! - **agent**: 运行时入口（补齐来源计数、运行控制器、写消息日志）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 阶段定义、工作流错误、依赖装配
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 对话消息、token 预算、消息日志持久化
//! - **observability**: tracing 日志初始化
//! - **research**: 规划、检索、起草、评审与修订状态机
//! - **tools**: 网络搜索与结构化输出 schema

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod research;
pub mod tools;

pub use agent::ResearchAgent;
pub use core::{Stage, WorkflowError};
pub use research::{PreloadedSources, RevisionController, RunOutcome};
