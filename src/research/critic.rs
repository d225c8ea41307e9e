//! Critic：对草稿给出评审意见
//!
//! 单次请求、不重试；评审为自由文本（篇幅、深度、风格等），只作为下一轮查询生成与修订的输入。

use std::sync::Arc;

use crate::llm::{LlmClient, LlmError};
use crate::memory::Message;
use crate::research::prompts;

/// Critic：持有 LLM 与 prompt 模板
pub struct Critic {
    llm: Arc<dyn LlmClient>,
    prompt_template: String,
}

impl Critic {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self::with_prompt(llm, prompts::REFLECT)
    }

    /// 使用自定义评审 prompt（如另配的评审模型，避免自我认同）
    pub fn with_prompt(llm: Arc<dyn LlmClient>, prompt_template: impl Into<String>) -> Self {
        Self {
            llm,
            prompt_template: prompt_template.into(),
        }
    }

    pub async fn critique(&self, draft: &str) -> Result<String, LlmError> {
        let messages = vec![
            Message::system(self.prompt_template.clone()),
            Message::user(draft),
        ];
        self.llm.complete(&messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[tokio::test]
    async fn test_critique_reviews_the_draft() {
        let critic = Critic::new(Arc::new(MockLlmClient));
        let feedback = critic.critique("An essay about rivers.").await.unwrap();
        assert!(feedback.contains("An essay about rivers."));
    }
}
