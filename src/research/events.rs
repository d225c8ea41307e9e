//! Run 过程事件：用于 CLI / 前端展示阶段切换、查询、跳过的来源与草稿进度

use serde::Serialize;

use crate::core::Stage;
use crate::research::IngestionSkip;

/// 预览最大字符数
pub const PREVIEW_CHARS: usize = 200;

/// 截取预览
pub fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

/// 单步过程事件（可序列化为 JSON）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    /// 进入阶段
    StageEntered { stage: Stage, revision: u32 },
    /// 生成的搜索查询
    QueriesGenerated {
        stage: Stage,
        queries: Vec<String>,
        results_per_query: usize,
    },
    /// 补充内容条数
    ContentAdded { stage: Stage, items: usize },
    /// 预置来源被跳过
    SourceSkipped { skip: IngestionSkip },
    /// 新草稿（预览）
    DraftProduced { revision: u32, preview: String },
    /// 评审意见（预览）
    CritiqueProduced { preview: String },
    /// run 结束
    Finished { revision: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(PREVIEW_CHARS + 10);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(ResearchEvent::StageEntered {
            stage: Stage::Drafting,
            revision: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "stage_entered");
        assert_eq!(json["stage"], "drafting");
    }
}
