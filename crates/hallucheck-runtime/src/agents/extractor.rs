//! Claim extractor.

use std::sync::Arc;

use hallucheck_core::{Answer, BulletClaimParser, Claim, ClaimParser};

use crate::client::LlmClient;
use crate::config::StageConfig;
use crate::prompts::extraction_messages;
use crate::providers::ProviderError;

/// Asks a model to list the answer's factual claims, then parses the list.
///
/// Parsing sits behind [`ClaimParser`] so a structured-output mode can
/// replace the bullet heuristic without touching the pipeline.
pub struct ClaimExtractor {
    client: Arc<LlmClient>,
    stage: StageConfig,
    parser: Arc<dyn ClaimParser>,
}

impl ClaimExtractor {
    pub fn new(client: Arc<LlmClient>, stage: StageConfig) -> Self {
        Self {
            client,
            stage,
            parser: Arc::new(BulletClaimParser),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn ClaimParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Extract claims in the order the model listed them.
    ///
    /// An empty result is a valid outcome, not an error.
    pub async fn extract(&self, answer: &Answer) -> Result<Vec<Claim>, ProviderError> {
        let request = self.stage.request(extraction_messages(answer.as_str()));
        let reply = self.client.complete(&self.stage.provider, request).await?;

        let claims = self.parser.parse(&reply);
        tracing::info!(claims = claims.len(), "Claims extracted");
        Ok(claims)
    }
}
