//! Scripted provider shared by stage and pipeline tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::client::LlmClient;
use crate::prompts::{
    CLAIM_LABEL, EXTRACTOR_SYSTEM_PROMPT, GENERATOR_SYSTEM_PROMPT, VERIFIER_SYSTEM_PROMPT,
};
use crate::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};
use crate::resilience::RetryPolicy;

/// Replies according to which stage's system prompt it receives.
pub(crate) struct ScriptedProvider {
    name: &'static str,
    answer: String,
    extraction: String,
    verdicts: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    fail_verification: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            answer: "An answer.".to_string(),
            extraction: String::new(),
            verdicts: HashMap::new(),
            delays: HashMap::new(),
            fail_verification: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn answer(mut self, answer: &str) -> Self {
        self.answer = answer.to_string();
        self
    }

    pub(crate) fn extraction(mut self, reply: &str) -> Self {
        self.extraction = reply.to_string();
        self
    }

    pub(crate) fn verdict(mut self, claim: &str, reply: &str) -> Self {
        self.verdicts.insert(claim.to_string(), reply.to_string());
        self
    }

    pub(crate) fn delay(mut self, claim: &str, delay: Duration) -> Self {
        self.delays.insert(claim.to_string(), delay);
        self
    }

    pub(crate) fn failing_verification(mut self) -> Self {
        self.fail_verification = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    async fn reply(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let system = request.messages[0].content.as_str();
        let user = request.messages[1].content.as_str();

        if system == GENERATOR_SYSTEM_PROMPT {
            Ok(self.answer.clone())
        } else if system == EXTRACTOR_SYSTEM_PROMPT {
            Ok(self.extraction.clone())
        } else if system == VERIFIER_SYSTEM_PROMPT {
            let claim = user
                .strip_prefix(CLAIM_LABEL)
                .map(str::trim)
                .unwrap_or(user);
            if let Some(delay) = self.delays.get(claim) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail_verification {
                return Err(ProviderError::AuthError);
            }
            Ok(self
                .verdicts
                .get(claim)
                .cloned()
                .unwrap_or_else(|| "TRUE".to_string()))
        } else {
            Err(ProviderError::InvalidRequest(format!("unexpected prompt: {system}")))
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let content = self.reply(request).await?;
        Ok(CompletionResponse {
            content,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 2,
            },
            model: request.model.clone(),
        })
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Client serving both "groq" and "openai" from scripted providers.
pub(crate) fn scripted_client(
    groq: Arc<ScriptedProvider>,
    openai: Arc<ScriptedProvider>,
) -> Arc<LlmClient> {
    Arc::new(
        LlmClient::new(Duration::from_secs(30), RetryPolicy::fail_fast())
            .with_provider(groq)
            .with_provider(openai),
    )
}
