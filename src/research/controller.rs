//! 修订控制器：显式有限状态机驱动 规划 → 检索 → 起草 → 评审 → 再检索 → 再起草 的循环
//!
//! next_stage 是纯函数 (Stage, &RunState) -> Stage；run 循环依次执行阶段并切换。
//! 每次经过 Drafting，revision_number 恰好 +1；Decide 在刚完成的修订号超过 max_revisions 时终止，
//! 因此 Drafting 至多执行 max_revisions + 1 次，不依赖模型给出「满意」信号。
//! 任一阶段的生成失败终止 run 并丢弃已累积状态；搜索失败与来源跳过只记录告警。

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::Instrument;
use uuid::Uuid;

use crate::core::{Stage, WorkflowError};
use crate::llm::LlmClient;
use crate::memory::{TokenCounter, DEFAULT_TOKEN_BUDGET};
use crate::research::events::preview;
use crate::research::{
    prompts, ContentAggregator, Critic, DraftGenerator, LlmQueryGenerator, Planner,
    PreloadedSources, QueryGenerator, QueryStage, ResearchEvent, RunState, SearchPolicy,
};
use crate::tools::{search_or_empty, SearchProvider};

/// 状态转移（纯函数）
pub fn next_stage(stage: Stage, state: &RunState) -> Stage {
    match stage {
        Stage::Start => Stage::Planning,
        Stage::Planning => {
            if state.has_pending_sources() {
                Stage::ContentIngestion
            } else {
                Stage::ResearchPlanning
            }
        }
        Stage::ContentIngestion => Stage::ResearchPlanning,
        Stage::ResearchPlanning => Stage::Drafting,
        Stage::Drafting => Stage::Decide,
        Stage::Decide => {
            if state.drafts_produced() > state.max_revisions() {
                Stage::Terminal
            } else {
                Stage::Reflecting
            }
        }
        Stage::Reflecting => Stage::ResearchCritique,
        Stage::ResearchCritique => Stage::Drafting,
        Stage::Terminal => Stage::Terminal,
    }
}

/// run 结果：最终草稿、终止时的修订号与经过的阶段序列
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub draft: String,
    pub revision_number: u32,
    pub visited: Vec<Stage>,
}

impl RunOutcome {
    /// 执行了实际工作的阶段（去掉 Start 与 Decide）
    pub fn work_stages(&self) -> Vec<Stage> {
        self.visited
            .iter()
            .copied()
            .filter(|s| !matches!(s, Stage::Start | Stage::Decide))
            .collect()
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.visited.iter().filter(|s| **s == stage).count()
    }
}

fn emit(events: Option<&UnboundedSender<ResearchEvent>>, event: ResearchEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// 修订控制器：依赖在构造时注入，可被多个并发 run 共享（每个 run 独占自己的 RunState）
pub struct RevisionController {
    planner: Planner,
    queries: Arc<dyn QueryGenerator>,
    search: Arc<dyn SearchProvider>,
    aggregator: ContentAggregator,
    drafter: DraftGenerator,
    critic: Critic,
    policy: SearchPolicy,
}

impl RevisionController {
    /// 所有生成阶段共用一个 LLM；查询生成走 LlmQueryGenerator 适配
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            planner: Planner::new(llm.clone()),
            queries: Arc::new(LlmQueryGenerator::new(llm.clone())),
            search,
            aggregator: ContentAggregator::new(DEFAULT_TOKEN_BUDGET),
            drafter: DraftGenerator::new(llm.clone()),
            critic: Critic::new(llm),
            policy: SearchPolicy::default(),
        }
    }

    pub fn with_query_generator(mut self, queries: Arc<dyn QueryGenerator>) -> Self {
        self.queries = queries;
        self
    }

    /// 评审使用单独的模型
    pub fn with_critic(mut self, critic: Critic) -> Self {
        self.critic = critic;
        self
    }

    pub fn with_policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_token_budget(mut self, token_budget: usize) -> Self {
        self.aggregator = ContentAggregator::new(token_budget);
        self
    }

    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.drafter = self.drafter.with_counter(counter);
        self
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    /// 运行一次完整流程，返回最终草稿
    pub async fn run(
        &self,
        task: &str,
        max_revisions: u32,
        sources: Option<PreloadedSources>,
    ) -> Result<String, WorkflowError> {
        self.run_with_report(task, max_revisions, sources, None)
            .await
            .map(|outcome| outcome.draft)
    }

    /// 运行一次完整流程，可选推送过程事件，返回草稿与阶段轨迹
    pub async fn run_with_report(
        &self,
        task: &str,
        max_revisions: u32,
        sources: Option<PreloadedSources>,
        events: Option<&UnboundedSender<ResearchEvent>>,
    ) -> Result<RunOutcome, WorkflowError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research_run", run_id = %run_id, max_revisions);

        async move {
            let mut state = RunState::new(task, max_revisions, sources);
            let mut stage = Stage::Start;
            let mut visited = Vec::new();

            loop {
                visited.push(stage);
                tracing::debug!(stage = %stage, revision = state.revision_number(), "entering stage");
                emit(
                    events,
                    ResearchEvent::StageEntered {
                        stage,
                        revision: state.revision_number(),
                    },
                );

                if let Err(e) = self.execute(stage, &mut state, events).await {
                    tracing::error!(stage = %stage, error = %e, "run aborted");
                    return Err(e);
                }
                if stage == Stage::Terminal {
                    break;
                }
                stage = next_stage(stage, &state);
            }

            let draft = state
                .draft
                .take()
                .filter(|d| !d.trim().is_empty())
                .ok_or(WorkflowError::NoDraft)?;
            tracing::info!(revision = state.revision_number(), "run finished");
            emit(
                events,
                ResearchEvent::Finished {
                    revision: state.revision_number(),
                },
            );

            Ok(RunOutcome {
                draft,
                revision_number: state.revision_number(),
                visited,
            })
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        stage: Stage,
        state: &mut RunState,
        events: Option<&UnboundedSender<ResearchEvent>>,
    ) -> Result<(), WorkflowError> {
        match stage {
            Stage::Start | Stage::Decide | Stage::Terminal => {}
            Stage::Planning => {
                let plan = self
                    .planner
                    .plan(state.task())
                    .await
                    .map_err(|e| WorkflowError::stage(stage, e))?;
                state.plan = Some(plan);
            }
            Stage::ContentIngestion => {
                if let Some(sources) = state.sources.take() {
                    let report = self.aggregator.ingest_preloaded(&sources);
                    for skip in report.skipped {
                        emit(events, ResearchEvent::SourceSkipped { skip });
                    }
                    state.mark_verified(report.has_verified);
                    state.extend_content(report.items);
                }
            }
            Stage::ResearchPlanning => {
                let seed = state.task().to_string();
                self.research(stage, QueryStage::Planning, &seed, state, events)
                    .await?;
            }
            Stage::Drafting => {
                let draft = {
                    let plan = state.plan.as_deref().unwrap_or_default();
                    self.drafter
                        .generate(
                            state.task(),
                            plan,
                            state.content_items(),
                            state.prior_revision(),
                        )
                        .await
                        .map_err(|e| WorkflowError::stage(stage, e))?
                };
                let draft_preview = preview(&draft);
                state.record_draft(draft);
                tracing::info!(revision = state.revision_number(), "draft produced");
                emit(
                    events,
                    ResearchEvent::DraftProduced {
                        revision: state.revision_number(),
                        preview: draft_preview,
                    },
                );
            }
            Stage::Reflecting => {
                let draft = state.draft.clone().unwrap_or_default();
                let critique = self
                    .critic
                    .critique(&draft)
                    .await
                    .map_err(|e| WorkflowError::stage(stage, e))?;
                emit(
                    events,
                    ResearchEvent::CritiqueProduced {
                        preview: preview(&critique),
                    },
                );
                state.critique = Some(critique);
            }
            Stage::ResearchCritique => {
                let seed = state
                    .critique
                    .clone()
                    .unwrap_or_else(|| state.task().to_string());
                self.research(stage, QueryStage::Critique, &seed, state, events)
                    .await?;
            }
        }
        Ok(())
    }

    /// 生成查询并逐条检索；单条查询的搜索失败以空结果替代
    async fn research(
        &self,
        stage: Stage,
        kind: QueryStage,
        seed: &str,
        state: &mut RunState,
        events: Option<&UnboundedSender<ResearchEvent>>,
    ) -> Result<(), WorkflowError> {
        let has_verified = state.has_verified_content();
        let limits = self.policy.for_stage(kind, has_verified);

        let template = match kind {
            QueryStage::Planning => prompts::RESEARCH_PLAN,
            QueryStage::Critique => prompts::RESEARCH_CRITIQUE,
        };
        let mut instructions = prompts::with_max_queries(template, limits.max_queries);
        if has_verified {
            instructions.push_str("\n\n");
            instructions.push_str(prompts::VERIFIED_GAPS);
        }

        let queries = self
            .queries
            .generate_queries(&instructions, seed, limits.max_queries)
            .await
            .map_err(|e| WorkflowError::stage(stage, e))?;
        tracing::info!(stage = %stage, queries = ?queries, "search queries generated");
        emit(
            events,
            ResearchEvent::QueriesGenerated {
                stage,
                queries: queries.clone(),
                results_per_query: limits.results_per_query,
            },
        );

        let mut added = 0;
        for query in &queries {
            let snippets =
                search_or_empty(self.search.as_ref(), query, limits.results_per_query).await;
            let items = self
                .aggregator
                .ingest_supplementary(query, snippets, has_verified);
            added += items.len();
            state.extend_content(items);
        }
        emit(events, ResearchEvent::ContentAdded { stage, items: added });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::research::SourceContent;
    use crate::tools::NoopSearch;

    #[test]
    fn test_planning_branches_on_sources() {
        let without = RunState::new("t", 1, None);
        assert_eq!(next_stage(Stage::Planning, &without), Stage::ResearchPlanning);

        let sources = PreloadedSources::new().with_file("a.txt", SourceContent::new("a"));
        let with = RunState::new("t", 1, Some(sources));
        assert_eq!(next_stage(Stage::Planning, &with), Stage::ContentIngestion);
    }

    #[test]
    fn test_decide_uses_revision_just_produced() {
        let mut state = RunState::new("t", 1, None);
        state.record_draft("first".into());
        assert_eq!(next_stage(Stage::Decide, &state), Stage::Reflecting);
        state.record_draft("second".into());
        assert_eq!(next_stage(Stage::Decide, &state), Stage::Terminal);
    }

    #[test]
    fn test_fixed_edges() {
        let state = RunState::new("t", 3, None);
        assert_eq!(next_stage(Stage::Start, &state), Stage::Planning);
        assert_eq!(next_stage(Stage::ContentIngestion, &state), Stage::ResearchPlanning);
        assert_eq!(next_stage(Stage::ResearchPlanning, &state), Stage::Drafting);
        assert_eq!(next_stage(Stage::Drafting, &state), Stage::Decide);
        assert_eq!(next_stage(Stage::Reflecting, &state), Stage::ResearchCritique);
        assert_eq!(next_stage(Stage::ResearchCritique, &state), Stage::Drafting);
        assert_eq!(next_stage(Stage::Terminal, &state), Stage::Terminal);
    }

    #[tokio::test]
    async fn test_zero_revisions_drafts_once() {
        let controller = RevisionController::new(Arc::new(MockLlmClient), Arc::new(NoopSearch));
        let outcome = controller
            .run_with_report("Write about owls", 0, None, None)
            .await
            .unwrap();
        assert_eq!(outcome.count(Stage::Drafting), 1);
        assert_eq!(outcome.count(Stage::Reflecting), 0);
        assert_eq!(outcome.count(Stage::ResearchCritique), 0);
        assert_eq!(outcome.revision_number, 2);
        assert!(!outcome.draft.is_empty());
    }

    #[tokio::test]
    async fn test_events_are_streamed() {
        let controller = RevisionController::new(Arc::new(MockLlmClient), Arc::new(NoopSearch));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        controller
            .run_with_report("Write about owls", 0, None, Some(&tx))
            .await
            .unwrap();
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events.first(),
            Some(&ResearchEvent::StageEntered {
                stage: Stage::Start,
                revision: 1
            })
        );
        assert_eq!(events.last(), Some(&ResearchEvent::Finished { revision: 2 }));
    }
}
