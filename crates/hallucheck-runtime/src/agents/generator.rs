//! Answer generator.

use std::sync::Arc;

use hallucheck_core::{Answer, Question};

use crate::client::LlmClient;
use crate::config::StageConfig;
use crate::prompts::generation_messages;
use crate::providers::ProviderError;

/// Produces the answer under test with one completion call.
pub struct AnswerGenerator {
    client: Arc<LlmClient>,
    stage: StageConfig,
}

impl AnswerGenerator {
    pub fn new(client: Arc<LlmClient>, stage: StageConfig) -> Self {
        Self { client, stage }
    }

    /// Ask the model the question and return its reply unmodified.
    pub async fn generate(&self, question: &Question) -> Result<Answer, ProviderError> {
        let request = self.stage.request(generation_messages(question.as_str()));
        let text = self.client.complete(&self.stage.provider, request).await?;

        tracing::info!(chars = text.len(), "Answer generated");
        Ok(Answer::new(text))
    }
}
