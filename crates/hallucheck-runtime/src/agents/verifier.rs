//! Claim verifier.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use hallucheck_core::{Claim, KeywordVerdictParser, Verdict, VerdictParser, VerificationResult};

use crate::client::LlmClient;
use crate::config::StageConfig;
use crate::prompts::verification_messages;
use crate::providers::ProviderError;

/// Judges each claim independently with its own completion call.
pub struct ClaimVerifier {
    client: Arc<LlmClient>,
    stage: StageConfig,
    parser: Arc<dyn VerdictParser>,
    concurrency: usize,
}

impl ClaimVerifier {
    pub fn new(client: Arc<LlmClient>, stage: StageConfig) -> Self {
        Self {
            client,
            stage,
            parser: Arc::new(KeywordVerdictParser),
            concurrency: 1,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn VerdictParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Maximum number of verification calls in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Verify one claim. The raw reply is normalized to a binary verdict.
    pub async fn verify_claim(&self, claim: &Claim) -> Result<Verdict, ProviderError> {
        let request = self.stage.request(verification_messages(claim.as_str()));
        let reply = self.client.complete(&self.stage.provider, request).await?;

        let verdict = self.parser.parse(&reply);
        tracing::debug!(claim = claim.as_str(), %verdict, "Claim verified");
        Ok(verdict)
    }

    /// Verify every claim, returning results in claim order.
    ///
    /// Calls may overlap up to the configured concurrency; the first failure
    /// aborts the batch and drops any calls still in flight.
    pub async fn verify_claims(
        &self,
        claims: &[Claim],
    ) -> Result<Vec<VerificationResult>, ProviderError> {
        let results: Vec<VerificationResult> = stream::iter(claims)
            .map(|claim| async move {
                let verdict = self.verify_claim(claim).await?;
                Ok::<_, ProviderError>(VerificationResult::new(claim.clone(), verdict))
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let supported = results.iter().filter(|r| r.verdict.is_true()).count();
        tracing::info!(
            claims = results.len(),
            supported,
            unsupported = results.len() - supported,
            "Claims verified"
        );
        Ok(results)
    }
}
