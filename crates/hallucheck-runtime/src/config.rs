//! Runtime configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config.
//!
//! ```yaml
//! generator:
//!   provider: groq
//!   model: llama-3.1-8b-instant
//!   temperature: 0.7
//! extractor:
//!   provider: openai
//!   model: gpt-4o-mini
//!   temperature: 0.0
//! verifier:
//!   provider: openai
//!   model: gpt-4o-mini
//!   temperature: 0.0
//! request_timeout: 30s
//! verify_concurrency: 4
//! retry:
//!   max_retries: 0
//! providers:
//!   openai:
//!     base_url: https://api.openai.com/v1
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::providers::{ChatMessage, CompletionRequest, ProviderError, MAX_TEMPERATURE};
use crate::resilience::RetryPolicy;

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    ProviderSetup(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ProviderError> for ConfigError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => ConfigError::ProviderSetup(msg),
            other => ConfigError::Invalid(other.to_string()),
        }
    }
}

/// Serde helper for human-readable durations ("30s", "500ms", "1m").
pub(crate) mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

/// Which provider and model one pipeline stage calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Registered provider type ("openai", "groq")
    pub provider: String,

    /// Model name passed to the provider
    pub model: String,

    /// Sampling temperature in `[0, 2]`
    pub temperature: f32,

    /// Optional completion token cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl StageConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Build a completion request for this stage.
    pub fn request(&self, messages: Vec<ChatMessage>) -> CompletionRequest {
        CompletionRequest::new(self.model.clone(), messages, self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    fn validate(&self, stage: &str) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{stage}.provider is empty")));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{stage}.model is empty")));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "{stage}.temperature {} outside [0, {}]",
                self.temperature, MAX_TEMPERATURE
            )));
        }
        Ok(())
    }
}

/// Configuration for a pipeline.
///
/// `Debug` redacts `api_key` values the same way [`RuntimeConfig::to_yaml`]
/// does, so a config can be logged.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Answer generation: fast model, moderate creativity
    pub generator: StageConfig,

    /// Claim extraction: deterministic
    pub extractor: StageConfig,

    /// Claim verification: deterministic
    pub verifier: StageConfig,

    /// Per-call timeout; an elapsed timeout is a provider error
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,

    /// Retry policy for transient provider errors
    pub retry: RetryPolicy,

    /// Maximum verification calls in flight
    pub verify_concurrency: usize,

    /// Provider config blocks keyed by provider type
    pub providers: BTreeMap<String, JsonValue>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            generator: StageConfig::new("groq", "llama-3.1-8b-instant", 0.7),
            extractor: StageConfig::new("openai", "gpt-4o-mini", 0.0),
            verifier: StageConfig::new("openai", "gpt-4o-mini", 0.0),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            verify_concurrency: 4,
            providers: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("generator", &self.generator)
            .field("extractor", &self.extractor)
            .field("verifier", &self.verifier)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .field("verify_concurrency", &self.verify_concurrency)
            .field("providers", &self.redacted().providers)
            .finish()
    }
}

impl RuntimeConfig {
    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Serialize to YAML with any `api_key` values redacted.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(&self.redacted())?)
    }

    /// Copy of this config that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for block in copy.providers.values_mut() {
            if let Some(key) = block.get_mut("api_key") {
                *key = JsonValue::String("[REDACTED]".to_string());
            }
        }
        copy
    }

    /// Set the API key for a provider, overriding config and environment.
    pub fn set_api_key(&mut self, provider: &str, api_key: impl Into<String>) {
        let block = self
            .providers
            .entry(provider.to_string())
            .or_insert_with(|| JsonValue::Object(Default::default()));
        if !block.is_object() {
            *block = JsonValue::Object(Default::default());
        }
        block["api_key"] = JsonValue::String(api_key.into());
    }

    /// Config block for a provider (`{}` when absent).
    pub fn provider_config(&self, provider: &str) -> JsonValue {
        self.providers
            .get(provider)
            .cloned()
            .unwrap_or_else(|| JsonValue::Object(Default::default()))
    }

    /// Providers the three stages need, deduplicated.
    pub fn referenced_providers(&self) -> BTreeSet<&str> {
        [&self.generator, &self.extractor, &self.verifier]
            .into_iter()
            .map(|s| s.provider.as_str())
            .collect()
    }

    /// Check stage settings and limits. Credentials are checked when
    /// providers are created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate("generator")?;
        self.extractor.validate("extractor")?;
        self.verifier.validate("verifier")?;

        if self.verify_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "verify_concurrency must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
