//! Draft Generator：依据任务、提纲与聚合内容起草文章
//!
//! 上下文块按 文件 → 网站 → 补充 排列；存在已验证内容时要求模型优先采信。
//! 有上一轮草稿与评审时以 assistant/user 轮次附上，让模型给出修订版。输出不做长度或格式校验。

use std::sync::Arc;

use crate::llm::{LlmClient, LlmError};
use crate::memory::{Message, TokenCounter, TokenEstimator};
use crate::research::{prompts, render_context, ContentItem};

pub struct DraftGenerator {
    llm: Arc<dyn LlmClient>,
    counter: Arc<dyn TokenCounter>,
}

impl DraftGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            counter: Arc::new(TokenEstimator),
        }
    }

    /// 替换上下文 token 统计所用的计数器
    pub fn with_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.counter = counter;
        self
    }

    /// 拼接 system prompt：写作指令 + （可选）已验证优先指令 + 上下文块
    pub fn system_prompt(items: &[ContentItem]) -> String {
        let mut system = String::from(prompts::WRITE);
        if items.iter().any(ContentItem::is_verified) {
            system.push_str("\n\n");
            system.push_str(prompts::VERIFIED_PRIORITY);
        }
        system.push_str("\n\n------\n\n");
        system.push_str(&render_context(items));
        system
    }

    pub fn build_messages(
        task: &str,
        plan: &str,
        items: &[ContentItem],
        prior: Option<(&str, &str)>,
    ) -> Vec<Message> {
        let mut messages = vec![
            Message::system(Self::system_prompt(items)),
            Message::user(format!("{}\n\nHere is my plan:\n\n{}", task, plan)),
        ];
        if let Some((draft, critique)) = prior {
            messages.push(Message::assistant(draft));
            messages.push(Message::user(format!("{}\n\n{}", prompts::REVISE, critique)));
        }
        messages
    }

    pub async fn generate(
        &self,
        task: &str,
        plan: &str,
        items: &[ContentItem],
        prior: Option<(&str, &str)>,
    ) -> Result<String, LlmError> {
        let messages = Self::build_messages(task, plan, items, prior);
        let context_tokens: usize = messages.iter().map(|m| self.counter.count(&m.content)).sum();
        tracing::debug!(
            items = items.len(),
            context_tokens,
            revising = prior.is_some(),
            "drafting essay"
        );
        self.llm.complete(&messages).await
    }
}
