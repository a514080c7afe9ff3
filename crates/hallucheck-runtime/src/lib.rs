//! # hallucheck-runtime
//!
//! Everything in hallucheck that talks to a model.
//!
//! `hallucheck-core` decides what a reply means; this crate decides what to
//! send, to whom, and what happens when the provider misbehaves. It provides:
//! - an OpenAI-compatible chat-completions client for OpenAI and Groq
//! - credential handling that never logs or echoes secrets
//! - timeout, optional retry and per-provider usage accounting
//! - the answer generator, claim extractor and claim verifier stages
//! - the [`Pipeline`] that runs a question through all of them
//!
//! ## Example
//!
//! ```rust,no_run
//! use hallucheck_runtime::{Pipeline, RuntimeConfig};
//!
//! # async fn demo() -> Result<(), hallucheck_runtime::PipelineError> {
//! let mut config = RuntimeConfig::default();
//! config.set_api_key("openai", "sk-...");
//! config.set_api_key("groq", "gsk_...");
//!
//! let pipeline = Pipeline::from_config(&config)?;
//! let report = pipeline.run("Who invented the telephone?").await?;
//!
//! if report.hallucinated() {
//!     println!("Hallucination detected");
//! }
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod client;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resilience;

#[cfg(test)]
mod testing;

pub use agents::{AnswerGenerator, ClaimExtractor, ClaimVerifier};
pub use client::LlmClient;
pub use config::{ConfigError, RuntimeConfig, StageConfig};
pub use orchestrator::{Pipeline, PipelineBuilder, PipelineError, RunOutcome, RunReport};
pub use providers::{
    ApiCredential, ChatMessage, CompletionRequest, CompletionResponse, LlmProvider,
    ProviderError, ProviderFactory, ProviderRegistry, Role, TokenUsage,
};
pub use resilience::{LlmUsage, RetryPolicy, UsageTracker};
