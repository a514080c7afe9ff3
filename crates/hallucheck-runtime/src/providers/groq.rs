//! Groq provider factory.
//!
//! Groq serves the chat-completions contract under `/openai/v1`, so this
//! module only wires the name, endpoint and credential variable.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::{
    factory::ProviderFactory,
    openai::{validate_base_url, ChatCompletionsProvider},
    secrets::KeySpec,
    LlmProvider, ProviderError,
};

/// Environment variable name for the Groq API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

const GROQ_KEY: KeySpec = KeySpec {
    label: "Groq API key",
    env_var: GROQ_API_KEY_ENV,
};

/// Default Groq endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Factory for Groq providers. Same config format as OpenAI.
pub struct GroqProviderFactory;

impl ProviderFactory for GroqProviderFactory {
    fn provider_type(&self) -> &'static str {
        "groq"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.validate_config(config)?;
        let provider =
            ChatCompletionsProvider::from_config("groq", config, &GROQ_KEY, GROQ_BASE_URL)?;
        Ok(Arc::new(provider))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !GROQ_KEY.is_set(config) {
            return Err(GROQ_KEY.missing());
        }
        validate_base_url(config)
    }

    fn description(&self) -> &'static str {
        "Groq low-latency chat completions (answer generation)"
    }
}
