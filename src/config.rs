//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SCRIBE__*` 覆盖（双下划线表示嵌套，如 `SCRIBE__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::memory::DEFAULT_TOKEN_BUDGET;
use crate::research::{SearchLimits, SearchPolicy};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub search: SearchSection,
    pub research: ResearchSection,
}

/// [app] 段：消息日志路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// 每次 run 的 {query, response, timestamp} 追加到此 JSON 文件
    pub message_log: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            message_log: PathBuf::from("data/messages.json"),
        }
    }
}

/// [llm] 段：后端选择与模型
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / deepseek / mock；实际选择还取决于 API Key 是否存在
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    /// 评审使用的模型（为空则与主模型相同）
    pub critic_model: Option<String>,
    pub deepseek: LlmDeepSeekSection,
    pub openai: LlmOpenAiSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            temperature: 0.0,
            critic_model: None,
            deepseek: LlmDeepSeekSection::default(),
            openai: LlmOpenAiSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

/// [search] 段：搜索提供方、API Key（缺省读 TAVILY_API_KEY）、超时、片段长度
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// tavily / none
    pub provider: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub max_snippet_chars: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            provider: "tavily".to_string(),
            api_key: None,
            endpoint: None,
            timeout_secs: 15,
            max_snippet_chars: 4000,
        }
    }
}

impl SearchSection {
    /// 配置值优先，其次环境变量 TAVILY_API_KEY
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("TAVILY_API_KEY").ok())
    }
}

/// [research] 段：token 预算、默认修订次数、检索策略
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchSection {
    /// 已验证来源的 token 上限
    pub token_budget: usize,
    pub default_max_revisions: u32,
    /// 为缺少 token 数的预置来源估算计数，使其参与预算
    pub count_missing_tokens: bool,
    pub policy: PolicySection,
}

impl Default for ResearchSection {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
            default_max_revisions: 2,
            count_missing_tokens: true,
            policy: PolicySection::default(),
        }
    }
}

/// [research.policy.*] 单格：查询数 × 每条结果数
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsSection {
    pub max_queries: usize,
    pub results_per_query: usize,
}

impl From<LimitsSection> for SearchLimits {
    fn from(s: LimitsSection) -> Self {
        SearchLimits::new(s.max_queries, s.results_per_query)
    }
}

impl From<SearchLimits> for LimitsSection {
    fn from(l: SearchLimits) -> Self {
        Self {
            max_queries: l.max_queries,
            results_per_query: l.results_per_query,
        }
    }
}

/// [research.policy] 段：缺省值与 SearchPolicy::default 一致
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    pub planning: LimitsSection,
    pub planning_verified: LimitsSection,
    pub critique: LimitsSection,
    pub critique_verified: LimitsSection,
}

impl Default for PolicySection {
    fn default() -> Self {
        let p = SearchPolicy::default();
        Self {
            planning: p.planning.into(),
            planning_verified: p.planning_verified.into(),
            critique: p.critique.into(),
            critique_verified: p.critique_verified.into(),
        }
    }
}

impl From<&PolicySection> for SearchPolicy {
    fn from(s: &PolicySection) -> Self {
        SearchPolicy {
            planning: s.planning.into(),
            planning_verified: s.planning_verified.into(),
            critique: s.critique.into(),
            critique_verified: s.critique_verified.into(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 SCRIBE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SCRIBE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!(path = %path.display(), "config file not found, ignoring");
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SCRIBE")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
