//! 依赖装配：从配置创建 LLM / 搜索客户端并构建 RevisionController
//!
//! 客户端只在这里创建一次，之后以 Arc 注入，所有 run 共享；测试可绕过本模块直接注入假实现。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient};
use crate::research::{Critic, RevisionController, SearchPolicy};
use crate::tools::{NoopSearch, SearchProvider, TavilySearch};

/// 按配置与环境变量选择 LLM 后端；无可用 Key 时回退到 Mock
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    create_llm(cfg, None)
}

fn create_llm(cfg: &AppConfig, model_override: Option<&str>) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    if provider == "mock" {
        tracing::info!("Using Mock LLM");
        return Arc::new(MockLlmClient);
    }

    let use_deepseek = provider == "deepseek"
        && (std::env::var("DEEPSEEK_API_KEY").is_ok() || std::env::var("OPENAI_API_KEY").is_ok());
    let use_openai = provider != "deepseek" && std::env::var("OPENAI_API_KEY").is_ok();

    if use_deepseek {
        let model = model_override
            .map(String::from)
            .or_else(|| cfg.llm.deepseek.model.clone())
            .unwrap_or_else(|| crate::llm::DEEPSEEK_CHAT.to_string());
        tracing::info!("Using DeepSeek LLM ({})", model);
        Arc::new(create_deepseek_client(Some(&model)))
    } else if use_openai {
        let model = model_override
            .map(String::from)
            .or_else(|| cfg.llm.openai.model.clone())
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(
            OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &model,
                std::env::var("OPENAI_API_KEY").ok().as_deref(),
            )
            .with_temperature(cfg.llm.temperature),
        )
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient)
    }
}

/// 按配置选择搜索提供方；未配置 Key 时使用 NoopSearch（只依赖已验证来源与模型知识）
pub fn create_search_from_config(cfg: &AppConfig) -> Arc<dyn SearchProvider> {
    let provider = cfg.search.provider.to_lowercase();
    match (provider.as_str(), cfg.search.resolved_api_key()) {
        ("tavily", Some(key)) => {
            match TavilySearch::new(key, cfg.search.timeout_secs, cfg.search.max_snippet_chars) {
                Ok(mut search) => {
                    if let Some(endpoint) = &cfg.search.endpoint {
                        search = search.with_endpoint(endpoint.clone());
                    }
                    Arc::new(search)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "tavily client unavailable, supplementary search disabled");
                    Arc::new(NoopSearch)
                }
            }
        }
        ("tavily", None) => {
            tracing::warn!("TAVILY_API_KEY not set, supplementary search disabled");
            Arc::new(NoopSearch)
        }
        _ => Arc::new(NoopSearch),
    }
}

/// 构建器：持有配置，可覆盖 LLM 与搜索客户端
pub struct ResearchBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl ResearchBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            search: None,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> RevisionController {
        let llm = self
            .llm
            .clone()
            .unwrap_or_else(|| create_llm_from_config(&self.config));
        let search = self
            .search
            .clone()
            .unwrap_or_else(|| create_search_from_config(&self.config));

        let mut controller = RevisionController::new(llm, search)
            .with_token_budget(self.config.research.token_budget)
            .with_policy(SearchPolicy::from(&self.config.research.policy));

        if self.llm.is_none() {
            if let Some(model) = self.config.llm.critic_model.as_deref() {
                controller = controller.with_critic(Critic::new(create_llm(&self.config, Some(model))));
            }
        }
        controller
    }
}
