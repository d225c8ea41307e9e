//! Token 计数与预算
//!
//! TokenCounter 抽象计数策略（可替换为真实分词器）；TokenBudget 记录已接纳的 token 数，
//! 超出上限的条目整体拒绝而不是截断。

/// Token 计数能力：与具体分词器解耦
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Token 估算器（简单的字符计数近似）
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenEstimator;

impl TokenEstimator {
    /// 估算文本的 token 数量
    /// 使用简单的启发式规则：英文约 4 字符/token，中文约 1.5 字符/token
    pub fn estimate(text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let mut ascii_chars = 0;
        let mut non_ascii_chars = 0;

        for c in text.chars() {
            if c.is_ascii() {
                ascii_chars += 1;
            } else {
                non_ascii_chars += 1;
            }
        }

        let tokens = ascii_chars / 4 + (non_ascii_chars as f64 / 1.5).ceil() as usize;
        tokens.max(1)
    }
}

impl TokenCounter for TokenEstimator {
    fn count(&self, text: &str) -> usize {
        Self::estimate(text)
    }
}

/// 已验证来源的 token 预算（默认 120K，对应常见长上下文模型的输入上限）
pub const DEFAULT_TOKEN_BUDGET: usize = 120_000;

/// Token 预算账本：running_total + tokens <= ceiling 时接纳
#[derive(Debug, Clone)]
pub struct TokenBudget {
    ceiling: usize,
    used: usize,
}

impl TokenBudget {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling, used: 0 }
    }

    /// 尝试占用 tokens；超出剩余预算时返回 false 且不改变账本
    pub fn try_admit(&mut self, tokens: usize) -> bool {
        match self.used.checked_add(tokens) {
            Some(total) if total <= self.ceiling => {
                self.used = total;
                true
            }
            _ => false,
        }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.ceiling.saturating_sub(self.used)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BUDGET)
    }
}
