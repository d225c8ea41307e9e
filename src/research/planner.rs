//! Planner：为任务生成文章提纲（每次 run 一次）

use std::sync::Arc;

use crate::llm::{LlmClient, LlmError};
use crate::memory::Message;
use crate::research::prompts;

/// Planner：持有 LLM 与 system prompt
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self::with_prompt(llm, prompts::PLAN)
    }

    pub fn with_prompt(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    pub async fn plan(&self, task: &str) -> Result<String, LlmError> {
        let messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(task),
        ];
        self.llm.complete(&messages).await
    }
}
