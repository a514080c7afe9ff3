//! LLM Provider abstractions for hallucheck-runtime.
//!
//! This module defines the trait for LLM providers and includes an
//! implementation of the chat-completions wire contract shared by OpenAI
//! and Groq.
//!
//! ## Security
//!
//! API keys are held in [`ApiCredential`] and never formatted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(any(feature = "openai", feature = "groq"))]
mod openai;

#[cfg(feature = "groq")]
mod groq;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource, KeySpec};

#[cfg(any(feature = "openai", feature = "groq"))]
pub use openai::{ChatCompletionsProvider, OpenAiProviderFactory, OPENAI_API_KEY_ENV};

#[cfg(feature = "groq")]
pub use groq::{GroqProviderFactory, GROQ_API_KEY_ENV};

/// Errors from LLM providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),

    #[error("Completion contained no choices")]
    EmptyCompletion,
}

impl ProviderError {
    /// Whether retrying the same request could succeed.
    ///
    /// Network failures, rate limits, timeouts and 5xx responses are
    /// transient. Auth, parse and request errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(_)
            | ProviderError::RateLimited { .. }
            | ProviderError::Timeout(_) => true,
            ProviderError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A chat message for LLM completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Highest temperature accepted by the chat-completions providers.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// A single completion request: model, messages, sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model to use
    pub model: String,

    /// Role-tagged messages, at least one
    pub messages: Vec<ChatMessage>,

    /// Temperature in `[0, 2]` (0.0 for deterministic)
    pub temperature: f32,

    /// Maximum tokens to generate (provider default when `None`)
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Check the request before it leaves the process.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.messages.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "at least one message is required".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "model name must not be empty".to_string(),
            ));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ProviderError::InvalidRequest(format!(
                "temperature {} outside [0, {}]",
                self.temperature, MAX_TEMPERATURE
            )));
        }
        Ok(())
    }
}

/// Response from an LLM completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text of the first choice
    pub content: String,

    /// Token usage
    pub usage: TokenUsage,

    /// Model that served the request
    pub model: String,
}

/// Token usage from a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Provider abstraction allows swapping LLM backends.
///
/// This is the only place where network calls to a model are made.
/// The core crate never calls this.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(&self, request: &CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;

    /// Provider name, used as the registry key and in logs.
    fn name(&self) -> &str;
}
