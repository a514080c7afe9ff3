//! Provider registry.
//!
//! Each pipeline stage names its provider by string ("openai", "groq").
//! The registry maps that name to a [`ProviderFactory`], which turns the
//! provider's JSON config block into a live [`LlmProvider`].
//!
//! ```ignore
//! let registry = ProviderRegistry::with_defaults();
//! let groq = registry.create("groq", &serde_json::json!({ "api_key": key }))?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{LlmProvider, ProviderError};

/// Builds one kind of provider from its config block.
pub trait ProviderFactory: Send + Sync {
    /// Name stages use to refer to this provider.
    fn provider_type(&self) -> &'static str;

    /// Build a provider. A missing or blank credential is
    /// [`ProviderError::NotConfigured`].
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError>;

    /// Check a config block without building anything.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    fn description(&self) -> &'static str {
        "LLM provider"
    }
}

/// Known provider kinds, keyed by name.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every provider compiled into this build.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "openai")]
        registry.register(Arc::new(super::OpenAiProviderFactory));

        #[cfg(feature = "groq")]
        registry.register(Arc::new(super::GroqProviderFactory));

        registry
    }

    /// Add a factory, replacing any previous one with the same name.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.provider_type(), factory);
    }

    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.factory(provider_type)?.create(config)
    }

    /// Fail on the first name with no registered factory.
    ///
    /// Lets a misspelled provider surface before any credential is loaded.
    pub fn ensure_known<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ProviderError> {
        names
            .into_iter()
            .try_for_each(|name| self.factory(name).map(|_| ()))
    }

    pub fn available_types(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Names with descriptions, sorted by name.
    pub fn descriptions(&self) -> Vec<(&'static str, &'static str)> {
        self.factories
            .iter()
            .map(|(name, factory)| (*name, factory.description()))
            .collect()
    }

    fn factory(&self, provider_type: &str) -> Result<&Arc<dyn ProviderFactory>, ProviderError> {
        self.factories.get(provider_type).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider '{}'. Available: {}",
                provider_type,
                self.available_types().join(", ")
            ))
        })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CompletionRequest, CompletionResponse, TokenUsage};
    use async_trait::async_trait;

    /// Answers every request with the `reply` from its config block.
    struct CannedProvider {
        reply: String,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse {
                content: self.reply.clone(),
                usage: TokenUsage::default(),
                model: request.model.clone(),
            })
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct CannedFactory(&'static str);

    impl ProviderFactory for CannedFactory {
        fn provider_type(&self) -> &'static str {
            "canned"
        }

        fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
            self.validate_config(config)?;
            Ok(Arc::new(CannedProvider {
                reply: config["reply"].as_str().unwrap_or_default().to_string(),
            }))
        }

        fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
            match config["reply"].as_str() {
                Some(_) => Ok(()),
                None => Err(ProviderError::NotConfigured("reply is required".into())),
            }
        }

        fn description(&self) -> &'static str {
            self.0
        }
    }

    #[tokio::test]
    async fn test_create_uses_config_block() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(CannedFactory("fixed replies")));

        let provider = registry
            .create("canned", &serde_json::json!({ "reply": "TRUE" }))
            .unwrap();
        let request = CompletionRequest::new("m", vec![], 0.0);
        assert_eq!(provider.complete(&request).await.unwrap().content, "TRUE");
    }

    #[test]
    fn test_factory_rejects_bad_block() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(CannedFactory("fixed replies")));

        assert!(matches!(
            registry.create("canned", &serde_json::json!({})),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_unknown_provider_lists_available() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(CannedFactory("fixed replies")));

        match registry.create("anthropic", &serde_json::json!({})) {
            Err(ProviderError::NotConfigured(msg)) => {
                assert!(msg.contains("'anthropic'"));
                assert!(msg.contains("canned"));
            }
            other => panic!("expected NotConfigured, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_ensure_known() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(CannedFactory("fixed replies")));

        assert!(registry.ensure_known(["canned", "canned"]).is_ok());
        assert!(registry.ensure_known(["canned", "groq"]).is_err());
        assert!(ProviderRegistry::new().ensure_known([]).is_ok());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(CannedFactory("first")));
        registry.register(Arc::new(CannedFactory("second")));

        assert_eq!(registry.descriptions(), vec![("canned", "second")]);
    }

    #[cfg(all(feature = "openai", feature = "groq"))]
    #[test]
    fn test_with_defaults_registers_both_providers() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.available_types(), vec!["groq", "openai"]);
    }
}
