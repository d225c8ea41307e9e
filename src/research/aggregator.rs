//! 内容聚合：合并预置（已验证）来源与补充搜索结果
//!
//! 文件优先于网站摄取；带 token 数的条目按预算整体接纳或跳过（不截断），
//! 无 token 数的条目直接接纳。摄取从不失败，跳过的条目只记录告警。

use serde::Serialize;

use crate::memory::TokenBudget;
use crate::research::{ContentItem, PreloadedSources, Provenance, SourceContent};

/// 条目被跳过的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IngestionSkip {
    /// 超出剩余预算
    OverBudget {
        source: String,
        tokens: usize,
        remaining: usize,
    },
    /// 抽取结果为空
    Empty { source: String },
}

impl IngestionSkip {
    pub fn source(&self) -> &str {
        match self {
            IngestionSkip::OverBudget { source, .. } | IngestionSkip::Empty { source } => source,
        }
    }
}

/// 摄取结果
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub items: Vec<ContentItem>,
    pub has_verified: bool,
    pub skipped: Vec<IngestionSkip>,
    /// 已占用的预算
    pub tokens_used: usize,
}

/// 内容聚合器：持有已验证来源的 token 上限
#[derive(Debug, Clone)]
pub struct ContentAggregator {
    token_budget: usize,
}

impl ContentAggregator {
    pub fn new(token_budget: usize) -> Self {
        Self { token_budget }
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// 摄取预置来源：先文件后网站
    pub fn ingest_preloaded(&self, sources: &PreloadedSources) -> IngestReport {
        let mut budget = TokenBudget::new(self.token_budget);
        let mut report = IngestReport::default();

        let candidates = sources
            .files
            .iter()
            .map(|f| (Provenance::VerifiedFile, f.name.as_str(), &f.content))
            .chain(
                sources
                    .websites
                    .iter()
                    .map(|w| (Provenance::VerifiedWebsite, w.url.as_str(), &w.content)),
            );

        for (provenance, label, content) in candidates {
            match Self::admit(&mut budget, label, content) {
                Ok(()) => report.items.push(ContentItem::new(provenance, label, &content.text)),
                Err(skip) => {
                    tracing::warn!(source = %label, skip = ?skip, "skipping preloaded source");
                    report.skipped.push(skip);
                }
            }
        }

        report.has_verified = !report.items.is_empty();
        report.tokens_used = budget.used();
        tracing::info!(
            admitted = report.items.len(),
            skipped = report.skipped.len(),
            tokens_used = report.tokens_used,
            "preloaded sources ingested"
        );
        report
    }

    fn admit(
        budget: &mut TokenBudget,
        label: &str,
        content: &SourceContent,
    ) -> Result<(), IngestionSkip> {
        if content.text.trim().is_empty() {
            return Err(IngestionSkip::Empty {
                source: label.to_string(),
            });
        }
        match content.token_count {
            Some(tokens) if !budget.try_admit(tokens) => Err(IngestionSkip::OverBudget {
                source: label.to_string(),
                tokens,
                remaining: budget.remaining(),
            }),
            _ => Ok(()),
        }
    }

    /// 包装一次查询的搜索片段为补充内容
    ///
    /// has_verified 只影响上游的检索广度（见 SearchPolicy），这里不做限制。
    pub fn ingest_supplementary(
        &self,
        query: &str,
        snippets: Vec<String>,
        _has_verified: bool,
    ) -> Vec<ContentItem> {
        snippets
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| ContentItem::new(Provenance::Supplementary, query, s))
            .collect()
    }
}

/// 拼接上下文块：文件、网站、补充依次排列，组内保持摄取顺序
pub fn render_context(items: &[ContentItem]) -> String {
    let mut ordered: Vec<&ContentItem> = items.iter().collect();
    ordered.sort_by_key(|item| item.provenance.rank());
    ordered
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, tokens: Option<usize>) -> (String, SourceContent) {
        (
            name.to_string(),
            SourceContent {
                text: format!("contents of {}", name),
                token_count: tokens,
            },
        )
    }

    #[test]
    fn test_budget_admits_first_two_of_three() {
        let mut sources = PreloadedSources::new();
        for (name, content) in [
            file("a.pdf", Some(50_000)),
            file("b.pdf", Some(50_000)),
            file("c.pdf", Some(50_000)),
        ] {
            sources = sources.with_file(name, content);
        }

        let report = ContentAggregator::new(120_000).ingest_preloaded(&sources);
        let labels: Vec<_> = report.items.iter().map(|i| i.source_label.as_str()).collect();
        assert_eq!(labels, vec!["a.pdf", "b.pdf"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source(), "c.pdf");
        assert_eq!(report.tokens_used, 100_000);
        assert!(report.has_verified);
    }

    #[test]
    fn test_later_smaller_item_still_fits() {
        let sources = PreloadedSources::new()
            .with_file("big.pdf", SourceContent::with_tokens("x", 100))
            .with_file("huge.pdf", SourceContent::with_tokens("y", 50))
            .with_website("https://small", SourceContent::with_tokens("z", 20));

        let report = ContentAggregator::new(120).ingest_preloaded(&sources);
        let labels: Vec<_> = report.items.iter().map(|i| i.source_label.as_str()).collect();
        assert_eq!(labels, vec!["big.pdf", "https://small"]);
    }

    #[test]
    fn test_uncounted_items_bypass_budget() {
        let sources = PreloadedSources::new()
            .with_file("full.pdf", SourceContent::with_tokens("x", 10))
            .with_website("https://site", SourceContent::new("no count"));

        let report = ContentAggregator::new(10).ingest_preloaded(&sources);
        assert_eq!(report.items.len(), 2);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_files_before_websites() {
        let sources = PreloadedSources::new()
            .with_website("https://first-added", SourceContent::new("site"))
            .with_file("doc.txt", SourceContent::new("file"));

        let report = ContentAggregator::new(1_000).ingest_preloaded(&sources);
        assert_eq!(report.items[0].provenance, Provenance::VerifiedFile);
        assert_eq!(report.items[1].provenance, Provenance::VerifiedWebsite);
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let sources = PreloadedSources::new().with_file("blank.pdf", SourceContent::new("  "));
        let report = ContentAggregator::new(1_000).ingest_preloaded(&sources);
        assert!(report.items.is_empty());
        assert!(!report.has_verified);
        assert_eq!(
            report.skipped,
            vec![IngestionSkip::Empty {
                source: "blank.pdf".into()
            }]
        );
    }

    #[test]
    fn test_supplementary_items_are_tagged() {
        let items = ContentAggregator::new(0).ingest_supplementary(
            "wind power",
            vec!["turbines".into(), "".into()],
            true,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].provenance, Provenance::Supplementary);
        assert_eq!(items[0].source_label, "wind power");
    }

    #[test]
    fn test_render_context_orders_by_provenance() {
        let items = vec![
            ContentItem::new(Provenance::Supplementary, "q", "SEARCH-BODY"),
            ContentItem::new(Provenance::VerifiedWebsite, "https://w", "SITE-BODY"),
            ContentItem::new(Provenance::VerifiedFile, "f.txt", "FILE-BODY"),
        ];
        let block = render_context(&items);
        let file = block.find("FILE-BODY").unwrap();
        let site = block.find("SITE-BODY").unwrap();
        let search = block.find("SEARCH-BODY").unwrap();
        assert!(file < site && site < search);
    }
}
