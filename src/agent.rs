//! 研究写作 Agent 运行时
//!
//! 供 CLI 或其他前端调用：补齐来源 token 计数，运行 RevisionController，
//! 成功后把 {query, response, timestamp} 追加到消息日志。失败的 run 不写日志。

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::config::AppConfig;
use crate::core::{ResearchBuilder, WorkflowError};
use crate::memory::{JsonMessageLog, MessageLog, MessageLogEntry, TokenCounter, TokenEstimator};
use crate::research::{PreloadedSources, ResearchEvent, RevisionController, RunOutcome};

/// 预构建的 Agent：控制器与日志可被多次 run 共享
pub struct ResearchAgent {
    controller: RevisionController,
    log: Option<Arc<dyn MessageLog>>,
    /// 为缺少计数的来源补齐 token 数；None 表示保持原样（缺计数的来源不受预算限制）
    counter: Option<Arc<dyn TokenCounter>>,
    default_max_revisions: u32,
}

impl ResearchAgent {
    pub fn new(controller: RevisionController) -> Self {
        Self {
            controller,
            log: None,
            counter: None,
            default_max_revisions: 2,
        }
    }

    /// 按配置装配：LLM / 搜索客户端、策略、预算、消息日志路径
    pub fn from_config(cfg: AppConfig) -> Self {
        let log: Arc<dyn MessageLog> = Arc::new(JsonMessageLog::new(&cfg.app.message_log));
        let counter: Option<Arc<dyn TokenCounter>> = if cfg.research.count_missing_tokens {
            Some(Arc::new(TokenEstimator))
        } else {
            None
        };
        let default_max_revisions = cfg.research.default_max_revisions;
        let controller = ResearchBuilder::new(cfg).build();

        Self {
            controller,
            log: Some(log),
            counter,
            default_max_revisions,
        }
    }

    pub fn with_log(mut self, log: Arc<dyn MessageLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn without_log(mut self) -> Self {
        self.log = None;
        self
    }

    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn with_default_max_revisions(mut self, max_revisions: u32) -> Self {
        self.default_max_revisions = max_revisions;
        self
    }

    pub fn default_max_revisions(&self) -> u32 {
        self.default_max_revisions
    }

    pub fn controller(&self) -> &RevisionController {
        &self.controller
    }

    /// 运行一次研究写作，返回最终文稿
    pub async fn run_research(
        &self,
        task: &str,
        max_revisions: Option<u32>,
        sources: Option<PreloadedSources>,
    ) -> Result<String, WorkflowError> {
        self.run_research_with_events(task, max_revisions, sources, None)
            .await
            .map(|outcome| outcome.draft)
    }

    /// 同 run_research，可选推送过程事件并返回完整 RunOutcome
    pub async fn run_research_with_events(
        &self,
        task: &str,
        max_revisions: Option<u32>,
        sources: Option<PreloadedSources>,
        events: Option<&UnboundedSender<ResearchEvent>>,
    ) -> Result<RunOutcome, WorkflowError> {
        let max_revisions = max_revisions.unwrap_or(self.default_max_revisions);
        let sources = sources.map(|mut s| {
            if let Some(counter) = &self.counter {
                s.fill_token_counts(counter.as_ref());
            }
            s
        });

        let outcome = self
            .controller
            .run_with_report(task, max_revisions, sources, events)
            .await?;

        // 日志写失败不影响已生成的文稿
        if let Some(log) = &self.log {
            if let Err(e) = log.append(MessageLogEntry::now(task, outcome.draft.clone())) {
                tracing::warn!(error = %e, "failed to append message log");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Stage;
    use crate::llm::{LlmClient, LlmError, MockLlmClient};
    use crate::memory::{InMemoryMessageLog, Message};
    use crate::research::SourceContent;
    use crate::tools::NoopSearch;
    use async_trait::async_trait;

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
            Err(LlmError::Request("offline".into()))
        }
    }

    fn mock_agent() -> ResearchAgent {
        ResearchAgent::new(RevisionController::new(
            Arc::new(MockLlmClient),
            Arc::new(NoopSearch),
        ))
    }

    #[tokio::test]
    async fn test_successful_run_is_logged() {
        let log = Arc::new(InMemoryMessageLog::new());
        let agent = mock_agent().with_log(log.clone());

        let draft = agent
            .run_research("Write about tides", Some(0), None)
            .await
            .unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "Write about tides");
        assert_eq!(entries[0].response, draft);
    }

    #[tokio::test]
    async fn test_failed_run_is_not_logged() {
        let log = Arc::new(InMemoryMessageLog::new());
        let agent = ResearchAgent::new(RevisionController::new(
            Arc::new(FailingLlm),
            Arc::new(NoopSearch),
        ))
        .with_log(log.clone());

        let err = agent
            .run_research("Write about tides", Some(1), None)
            .await
            .unwrap_err();
        assert_eq!(err.failed_stage(), Stage::Planning);
        assert!(log.entries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_default_max_revisions_applies() {
        let agent = mock_agent().with_default_max_revisions(1);
        let outcome = agent
            .run_research_with_events("Write about tides", None, None, None)
            .await
            .unwrap();
        assert_eq!(outcome.count(Stage::Drafting), 2);
    }

    #[tokio::test]
    async fn test_sources_route_through_ingestion() {
        let agent = mock_agent().with_token_counter(Arc::new(TokenEstimator));
        let sources =
            PreloadedSources::new().with_file("notes.txt", SourceContent::new("tidal data"));
        let outcome = agent
            .run_research_with_events("Write about tides", Some(0), Some(sources), None)
            .await
            .unwrap();
        assert_eq!(outcome.count(Stage::ContentIngestion), 1);
    }
}
