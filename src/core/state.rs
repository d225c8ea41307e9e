//! 工作流阶段定义
//!
//! Start → Planning → [ContentIngestion] → ResearchPlanning → Drafting → Decide
//! → (Reflecting → ResearchCritique → Drafting …) → Terminal。

use std::fmt;

use serde::Serialize;

/// 修订控制器的状态机阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Planning,
    ContentIngestion,
    ResearchPlanning,
    Drafting,
    Decide,
    Reflecting,
    ResearchCritique,
    Terminal,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Planning => "planning",
            Stage::ContentIngestion => "content_ingestion",
            Stage::ResearchPlanning => "research_planning",
            Stage::Drafting => "drafting",
            Stage::Decide => "decide",
            Stage::Reflecting => "reflecting",
            Stage::ResearchCritique => "research_critique",
            Stage::Terminal => "terminal",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
