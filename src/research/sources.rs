//! 预置来源：请求方在 run 之前提供的文件与网站文本
//!
//! 结构与持久化层一致：`{files: [{name, content: {text, token_count}}], websites: [{url, content: {...}}]}`。
//! 文本抽取、OCR、抓取在外部完成，这里只接收结果。

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::memory::TokenCounter;

/// 已抽取的文本与（可选）预计算 token 数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContent {
    pub text: String,
    #[serde(default, alias = "tokenCount")]
    pub token_count: Option<usize>,
}

impl SourceContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token_count: None,
        }
    }

    pub fn with_tokens(text: impl Into<String>, token_count: usize) -> Self {
        Self {
            text: text.into(),
            token_count: Some(token_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSource {
    pub name: String,
    pub content: SourceContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteSource {
    pub url: String,
    pub content: SourceContent,
}

/// 一次 run 的预置来源集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadedSources {
    #[serde(default)]
    pub files: Vec<FileSource>,
    #[serde(default)]
    pub websites: Vec<WebsiteSource>,
}

impl PreloadedSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, content: SourceContent) -> Self {
        self.files.push(FileSource {
            name: name.into(),
            content,
        });
        self
    }

    pub fn with_website(mut self, url: impl Into<String>, content: SourceContent) -> Self {
        self.websites.push(WebsiteSource {
            url: url.into(),
            content,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.websites.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.websites.len()
    }

    /// 从 JSON 文件加载
    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid sources JSON in {}", path.display()))
    }

    /// 为缺少 token 数的条目补齐计数（上传时分词的替代），已有计数保持不变
    pub fn fill_token_counts(&mut self, counter: &dyn TokenCounter) {
        let contents = self
            .files
            .iter_mut()
            .map(|f| &mut f.content)
            .chain(self.websites.iter_mut().map(|w| &mut w.content));
        for content in contents {
            if content.token_count.is_none() {
                content.token_count = Some(counter.count(&content.text));
            }
        }
    }
}
