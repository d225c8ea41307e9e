//! Run 状态：单次 run 内在各阶段间传递的可变记录
//!
//! 由 RevisionController 独占；run 结束（成功或失败）即丢弃，不跨 run 持久化。

use serde::Serialize;

use crate::research::PreloadedSources;

/// 内容来源标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// 请求方上传的文件
    VerifiedFile,
    /// 请求方指定的网站
    VerifiedWebsite,
    /// run 内自行搜索得到
    Supplementary,
}

impl Provenance {
    pub fn is_verified(&self) -> bool {
        !matches!(self, Provenance::Supplementary)
    }

    /// 上下文拼接顺序：文件 < 网站 < 补充
    pub fn rank(&self) -> u8 {
        match self {
            Provenance::VerifiedFile => 0,
            Provenance::VerifiedWebsite => 1,
            Provenance::Supplementary => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provenance::VerifiedFile => "Verified file",
            Provenance::VerifiedWebsite => "Verified website",
            Provenance::Supplementary => "Supplementary search result",
        }
    }
}

/// 单条内容：text 首行嵌入来源标签，供提示词直接使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub text: String,
    pub provenance: Provenance,
    pub source_label: String,
}

impl ContentItem {
    pub fn new(provenance: Provenance, source_label: impl Into<String>, body: &str) -> Self {
        let source_label = source_label.into();
        Self {
            text: format!("[{}: {}]\n{}", provenance.label(), source_label, body.trim()),
            provenance,
            source_label,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.provenance.is_verified()
    }
}

/// 单次 run 的状态
#[derive(Debug, Clone)]
pub struct RunState {
    task: String,
    max_revisions: u32,
    pub plan: Option<String>,
    pub draft: Option<String>,
    pub critique: Option<String>,
    content_items: Vec<ContentItem>,
    revision_number: u32,
    has_verified_content: bool,
    /// 待摄取的预置来源；ContentIngestion 阶段取走
    pub sources: Option<PreloadedSources>,
}

impl RunState {
    pub fn new(task: impl Into<String>, max_revisions: u32, sources: Option<PreloadedSources>) -> Self {
        Self {
            task: task.into(),
            max_revisions,
            plan: None,
            draft: None,
            critique: None,
            content_items: Vec::new(),
            revision_number: 1,
            has_verified_content: false,
            sources,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn max_revisions(&self) -> u32 {
        self.max_revisions
    }

    pub fn revision_number(&self) -> u32 {
        self.revision_number
    }

    /// 已完成的草稿数（revision_number 从 1 起，每次起草 +1）
    pub fn drafts_produced(&self) -> u32 {
        self.revision_number - 1
    }

    pub fn has_verified_content(&self) -> bool {
        self.has_verified_content
    }

    pub fn content_items(&self) -> &[ContentItem] {
        &self.content_items
    }

    /// 是否有待摄取的非空预置来源
    pub fn has_pending_sources(&self) -> bool {
        self.sources.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// 追加内容（只追加，不删改）
    pub fn extend_content(&mut self, items: impl IntoIterator<Item = ContentItem>) {
        self.content_items.extend(items);
    }

    /// 标记已摄取到已验证内容；只能置为 true
    pub fn mark_verified(&mut self, has_verified: bool) {
        self.has_verified_content |= has_verified;
    }

    /// 记录新草稿并推进修订号
    pub fn record_draft(&mut self, draft: String) {
        self.draft = Some(draft);
        self.revision_number += 1;
    }

    /// 上一轮草稿与评审（二者都存在时才返回）
    pub fn prior_revision(&self) -> Option<(&str, &str)> {
        match (&self.draft, &self.critique) {
            (Some(d), Some(c)) => Some((d.as_str(), c.as_str())),
            _ => None,
        }
    }
}
