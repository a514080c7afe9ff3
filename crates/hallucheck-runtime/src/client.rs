//! LLM client adapter.
//!
//! One uniform entry point for every model call in the pipeline: pick a
//! provider by name, send a validated request, get the first choice's text
//! back. Timeout, retry and usage accounting all happen here.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{ConfigError, RuntimeConfig};
use crate::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, ProviderRegistry,
};
use crate::resilience::{LlmUsage, RetryPolicy, UsageTracker};

/// Providers plus the call policy shared by all pipeline stages.
///
/// Built once at startup and handed to each stage; nothing about it is
/// global.
pub struct LlmClient {
    providers: BTreeMap<String, Arc<dyn LlmProvider>>,
    timeout: Duration,
    retry: RetryPolicy,
    usage: UsageTracker,
}

impl LlmClient {
    /// Create a client with no providers.
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            providers: BTreeMap::new(),
            timeout,
            retry,
            usage: UsageTracker::new(),
        }
    }

    /// Add a provider, keyed by [`LlmProvider::name`].
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    /// Create every provider the config references.
    ///
    /// Fails before any network traffic when a credential is missing or blank.
    pub fn from_config(
        config: &RuntimeConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, ConfigError> {
        let mut client = Self::new(config.request_timeout, config.retry.clone());
        let names = config.referenced_providers();
        registry.ensure_known(names.iter().copied())?;

        for name in names {
            let provider = registry.create(name, &config.provider_config(name))?;
            tracing::debug!(provider = name, "Provider configured");
            client.providers.insert(name.to_string(), provider);
        }

        Ok(client)
    }

    /// Send one completion request and return the first choice's text.
    pub async fn complete(
        &self,
        provider: &str,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        request.validate()?;

        let backend = self.providers.get(provider).ok_or_else(|| {
            ProviderError::NotConfigured(format!("Provider '{}' is not configured", provider))
        })?;

        let started = Instant::now();
        let response = self
            .retry
            .run(|| self.call_once(backend.as_ref(), &request))
            .await
            .map_err(|e| {
                tracing::warn!(provider, model = %request.model, error = %e, "LLM call failed");
                e
            })?;

        self.usage.record(provider, &response.usage);

        tracing::debug!(
            provider,
            model = %response.model,
            temperature = request.temperature,
            messages = request.messages.len(),
            tokens = response.usage.total(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "LLM call completed"
        );

        Ok(response.content)
    }

    async fn call_once(
        &self,
        provider: &dyn LlmProvider,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        match tokio::time::timeout(self.timeout, provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }

    /// Names of configured providers.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }

    /// Usage accumulated since this client was created.
    pub fn usage(&self) -> LlmUsage {
        self.usage.snapshot()
    }

    /// Reset usage counters.
    pub fn reset_usage(&self) {
        self.usage.reset();
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("providers", &self.provider_names())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ApiCredential, ChatMessage, KeySpec, ProviderFactory, TokenUsage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(CompletionResponse {
                content: last,
                usage: TokenUsage {
                    prompt_tokens: 7,
                    completion_tokens: 3,
                },
                model: request.model.clone(),
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(ProviderError::EmptyCompletion)
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct FlakyProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ProviderError::ApiError {
                    status: 503,
                    message: "overloaded".into(),
                });
            }
            Ok(CompletionResponse {
                content: "ok".into(),
                usage: TokenUsage::default(),
                model: "m".into(),
            })
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("m", vec![ChatMessage::user("hello")], 0.0)
    }

    #[tokio::test]
    async fn test_complete_returns_text_and_records_usage() {
        let client = LlmClient::new(Duration::from_secs(5), RetryPolicy::fail_fast())
            .with_provider(Arc::new(EchoProvider));

        let text = client.complete("echo", request()).await.unwrap();
        assert_eq!(text, "hello");

        let usage = client.usage();
        assert_eq!(usage.llm_calls, 1);
        assert_eq!(usage.total_tokens(), 10);
        assert_eq!(usage.calls_by_provider["echo"], 1);
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let client = LlmClient::new(Duration::from_secs(5), RetryPolicy::fail_fast());
        let result = client.complete("openai", request()).await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_call() {
        let client = LlmClient::new(Duration::from_secs(5), RetryPolicy::fail_fast())
            .with_provider(Arc::new(EchoProvider));

        let bad = CompletionRequest::new("m", vec![], 0.0);
        let result = client.complete("echo", bad).await;
        assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
        assert_eq!(client.usage().llm_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_provider_error() {
        let client = LlmClient::new(Duration::from_secs(2), RetryPolicy::fail_fast())
            .with_provider(Arc::new(SlowProvider));

        let result = client.complete("slow", request()).await;
        assert!(matches!(result, Err(ProviderError::Timeout(d)) if d == Duration::from_secs(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_server_error() {
        let flaky = Arc::new(FlakyProvider {
            calls: AtomicUsize::new(0),
        });
        let client = LlmClient::new(Duration::from_secs(5), RetryPolicy::with_retries(2))
            .with_provider(flaky.clone());

        assert_eq!(client.complete("flaky", request()).await.unwrap(), "ok");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fail_fast_surfaces_server_error() {
        let client = LlmClient::new(Duration::from_secs(5), RetryPolicy::fail_fast())
            .with_provider(Arc::new(FlakyProvider {
                calls: AtomicUsize::new(0),
            }));

        let result = client.complete("flaky", request()).await;
        assert!(matches!(result, Err(ProviderError::ApiError { status: 503, .. })));
    }

    #[cfg(all(feature = "openai", feature = "groq"))]
    #[test]
    fn test_from_config_builds_referenced_providers() {
        let mut config = RuntimeConfig::default();
        config.set_api_key("openai", "sk-test");
        config.set_api_key("groq", "gsk-test");

        let client = LlmClient::from_config(&config, &ProviderRegistry::with_defaults()).unwrap();
        assert_eq!(client.provider_names(), vec!["groq", "openai"]);
    }

    /// Resolves its key like the real factories, from a variable no
    /// environment sets.
    struct UnsetKeyFactory {
        name: &'static str,
        created: AtomicUsize,
    }

    impl ProviderFactory for UnsetKeyFactory {
        fn provider_type(&self) -> &'static str {
            self.name
        }

        fn create(
            &self,
            config: &serde_json::Value,
        ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
            ApiCredential::resolve(config, &UNSET_KEY)?;
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EchoProvider))
        }

        fn validate_config(&self, _config: &serde_json::Value) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    const UNSET_KEY: KeySpec = KeySpec {
        label: "Test API key",
        env_var: "HALLUCHECK_TEST_KEY_NEVER_SET_9183",
    };

    #[test]
    fn test_from_config_blank_key_is_config_error() {
        let mut registry = ProviderRegistry::new();
        let mut factories = Vec::new();
        for name in ["openai", "groq"] {
            let factory = Arc::new(UnsetKeyFactory {
                name,
                created: AtomicUsize::new(0),
            });
            registry.register(factory.clone());
            factories.push(factory);
        }

        let mut config = RuntimeConfig::default();
        config.set_api_key("openai", "   ");
        config.set_api_key("groq", "");

        let err = LlmClient::from_config(&config, &registry).unwrap_err();
        assert!(matches!(err, ConfigError::ProviderSetup(_)));
        assert!(err.to_string().contains("HALLUCHECK_TEST_KEY_NEVER_SET_9183"));
        assert!(factories.iter().all(|f| f.created.load(Ordering::SeqCst) == 0));
    }

    #[test]
    fn test_from_config_unknown_provider_is_config_error() {
        let mut config = RuntimeConfig::default();
        config.verifier.provider = "nonexistent".into();

        let result = LlmClient::from_config(&config, &ProviderRegistry::new());
        assert!(matches!(result, Err(ConfigError::ProviderSetup(_))));
    }
}
