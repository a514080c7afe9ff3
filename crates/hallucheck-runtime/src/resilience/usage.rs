//! Token usage accounting across provider calls.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::providers::TokenUsage;

/// Accumulated LLM usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Number of successful LLM calls
    pub llm_calls: u32,

    /// Total prompt tokens
    pub prompt_tokens: u64,

    /// Total completion tokens
    pub completion_tokens: u64,

    /// Successful calls per provider
    pub calls_by_provider: BTreeMap<String, u32>,
}

impl LlmUsage {
    /// Add usage from one completed call.
    pub fn add(&mut self, provider: &str, usage: &TokenUsage) {
        self.llm_calls += 1;
        self.prompt_tokens += u64::from(usage.prompt_tokens);
        self.completion_tokens += u64::from(usage.completion_tokens);
        *self.calls_by_provider.entry(provider.to_string()).or_insert(0) += 1;
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Usage accrued since an earlier snapshot of the same tracker.
    pub fn since(&self, earlier: &LlmUsage) -> LlmUsage {
        let calls_by_provider = self
            .calls_by_provider
            .iter()
            .filter_map(|(provider, calls)| {
                let before = earlier.calls_by_provider.get(provider).copied().unwrap_or(0);
                let delta = calls.saturating_sub(before);
                (delta > 0).then(|| (provider.clone(), delta))
            })
            .collect();

        LlmUsage {
            llm_calls: self.llm_calls.saturating_sub(earlier.llm_calls),
            prompt_tokens: self.prompt_tokens.saturating_sub(earlier.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_sub(earlier.completion_tokens),
            calls_by_provider,
        }
    }
}

/// Thread-safe usage tracker shared by concurrent verification calls.
#[derive(Debug, Default)]
pub struct UsageTracker {
    usage: RwLock<LlmUsage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record usage after a call.
    pub fn record(&self, provider: &str, usage: &TokenUsage) {
        self.usage.write().add(provider, usage);
    }

    /// Get current usage.
    pub fn snapshot(&self) -> LlmUsage {
        self.usage.read().clone()
    }

    /// Reset all counters.
    pub fn reset(&self) {
        *self.usage.write() = LlmUsage::default();
    }
}
