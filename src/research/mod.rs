//! 研究写作流程：来源、Run 状态、内容聚合、查询生成、Planner、起草、评审、修订控制器

pub mod aggregator;
pub mod controller;
pub mod critic;
pub mod drafter;
pub mod events;
pub mod planner;
pub mod prompts;
pub mod queries;
pub mod sources;
pub mod state;

pub use aggregator::{render_context, ContentAggregator, IngestReport, IngestionSkip};
pub use controller::{next_stage, RevisionController, RunOutcome};
pub use critic::Critic;
pub use drafter::DraftGenerator;
pub use events::ResearchEvent;
pub use planner::Planner;
pub use queries::{
    parse_queries, LlmQueryGenerator, QueryGenerator, QueryStage, SearchLimits, SearchPolicy,
};
pub use sources::{FileSource, PreloadedSources, SourceContent, WebsiteSource};
pub use state::{ContentItem, Provenance, RunState};
