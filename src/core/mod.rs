//! 核心层：阶段定义、工作流错误、依赖装配

pub mod builder;
pub mod error;
pub mod state;

pub use builder::{create_llm_from_config, create_search_from_config, ResearchBuilder};
pub use error::WorkflowError;
pub use state::Stage;
