//! 工作流错误类型
//!
//! 阶段内的生成失败不在本地恢复，包装为 WorkflowError 终止 run；搜索失败与来源跳过不在此列。

use thiserror::Error;

use crate::core::Stage;
use crate::llm::LlmError;

/// 返回给调用方的顶层错误：携带失败阶段与底层原因；部分进度不返回
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Stage `{stage}` failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    #[error("Run finished without producing a draft")]
    NoDraft,
}

impl WorkflowError {
    pub fn stage(stage: Stage, source: LlmError) -> Self {
        WorkflowError::Stage { stage, source }
    }

    /// 失败阶段（NoDraft 视为终态失败）
    pub fn failed_stage(&self) -> Stage {
        match self {
            WorkflowError::Stage { stage, .. } => *stage,
            WorkflowError::NoDraft => Stage::Terminal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_message() {
        let err = WorkflowError::stage(Stage::Reflecting, LlmError::EmptyResponse);
        assert_eq!(
            err.to_string(),
            "Stage `reflecting` failed: LLM returned an empty response"
        );
        assert_eq!(err.failed_stage(), Stage::Reflecting);
        assert!(std::error::Error::source(&err).is_some());
    }
}
