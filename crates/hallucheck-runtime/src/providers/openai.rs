//! Chat-completions provider (OpenAI wire format).
//!
//! OpenAI and Groq speak the same `POST {base_url}/chat/completions`
//! contract, so one provider type serves both; the factories differ only
//! in name, base URL and credential variable.
//!
//! ## Security
//!
//! The API key is held in an [`ApiCredential`] and only exposed when the
//! bearer header is set.

use super::{
    factory::ProviderFactory,
    secrets::{ApiCredential, CredentialSource, KeySpec},
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable name for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub(crate) const OPENAI_KEY: KeySpec = KeySpec {
    label: "OpenAI API key",
    env_var: OPENAI_API_KEY_ENV,
};

/// Default OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider for any chat-completions compatible endpoint.
pub struct ChatCompletionsProvider {
    name: &'static str,
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsProvider")
            .field("name", &self.name)
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ChatCompletionsProvider {
    /// Create a provider with an already-loaded credential.
    pub fn new(
        name: &'static str,
        credential: ApiCredential,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        if credential.is_blank() {
            return Err(ProviderError::NotConfigured(format!(
                "{} must not be empty",
                credential.label()
            )));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            name,
            credential,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// OpenAI provider with a programmatic key.
    pub fn openai(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::new(api_key, CredentialSource::Explicit, OPENAI_KEY.label);
        Self::new("openai", credential, OPENAI_BASE_URL)
    }

    /// Build from JSON configuration with environment fallback.
    ///
    /// Reads `api_key` (falling back to the key's environment variable)
    /// and `base_url`.
    pub(crate) fn from_config(
        name: &'static str,
        config: &JsonValue,
        key: &KeySpec,
        default_base_url: &str,
    ) -> Result<Self, ProviderError> {
        let credential = ApiCredential::resolve(config, key)?;
        let base_url = config["base_url"].as_str().unwrap_or(default_base_url);
        Self::new(name, credential, base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ReplyUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Take the first choice's text out of a parsed reply.
fn into_completion(reply: ChatCompletionReply) -> Result<CompletionResponse, ProviderError> {
    let content = reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ProviderError::EmptyCompletion)?;

    let usage = reply
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content,
        usage,
        model: reply.model,
    })
}

/// Map a non-success status and body to a provider error.
fn error_for_status(status: u16, retry_after: Option<Duration>, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthError,
        429 => ProviderError::RateLimited { retry_after },
        _ => {
            let message = serde_json::from_str::<ErrorEnvelope>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.to_string());
            ProviderError::ApiError { status, message }
        }
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = ChatCompletionBody::from(request);

        // Only expose the credential here, at the point of use
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status.as_u16(), retry_after, &text));
        }

        let reply: ChatCompletionReply = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        into_completion(reply)
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Validate the optional `base_url` field of a provider config block.
pub(crate) fn validate_base_url(config: &JsonValue) -> Result<(), ProviderError> {
    if let Some(url) = config["base_url"].as_str() {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProviderError::NotConfigured(
                "base_url must start with http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

/// Factory for OpenAI providers.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "sk-...",              // Optional, falls back to OPENAI_API_KEY env
///   "base_url": "https://..."         // Optional, custom API endpoint
/// }
/// ```
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "openai"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.validate_config(config)?;
        let provider =
            ChatCompletionsProvider::from_config("openai", config, &OPENAI_KEY, OPENAI_BASE_URL)?;
        Ok(Arc::new(provider))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !OPENAI_KEY.is_set(config) {
            return Err(OPENAI_KEY.missing());
        }
        validate_base_url(config)
    }

    fn description(&self) -> &'static str {
        "OpenAI chat completions (claim extraction and verification)"
    }
}
