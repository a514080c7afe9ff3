//! Pipeline orchestrator.
//!
//! Runs one question through generation, extraction, verification and
//! aggregation:
//! - the question is validated before any model call
//! - an empty claim list ends the run without verification
//! - verification fans out with bounded concurrency and fans back in
//!   claim order
//! - the first provider failure ends the run

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use hallucheck_core::{
    Aggregator, Answer, Assessment, Claim, ClaimParser, InputError, Question, VerdictParser,
    VerificationResult,
};

use crate::agents::{AnswerGenerator, ClaimExtractor, ClaimVerifier};
use crate::client::LlmClient;
use crate::config::{ConfigError, RuntimeConfig};
use crate::providers::{ProviderError, ProviderRegistry};
use crate::resilience::LlmUsage;

/// Why a run ended without a report.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl PipelineError {
    /// Input problems are shown as a prompt, not a failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The extractor found nothing to check.
    NoClaims,

    /// Every claim was verified and the verdicts aggregated.
    Assessed {
        results: Vec<VerificationResult>,
        assessment: Assessment,
    },
}

impl RunOutcome {
    /// Whether a hallucination was detected. `false` when there were no claims.
    pub fn hallucinated(&self) -> bool {
        match self {
            Self::NoClaims => false,
            Self::Assessed { assessment, .. } => assessment.hallucinated,
        }
    }
}

/// Everything a presentation layer needs to show for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub question: Question,
    pub answer: Answer,
    pub claims: Vec<Claim>,
    pub outcome: RunOutcome,
    /// Calls and tokens spent on this run only.
    pub usage: LlmUsage,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn hallucinated(&self) -> bool {
        self.outcome.hallucinated()
    }
}

/// The three model-backed stages plus the aggregator, sharing one client.
pub struct Pipeline {
    client: Arc<LlmClient>,
    generator: AnswerGenerator,
    extractor: ClaimExtractor,
    verifier: ClaimVerifier,
    aggregator: Aggregator,
}

impl Pipeline {
    /// Wire the stages from `config` around an existing client.
    pub fn new(client: Arc<LlmClient>, config: &RuntimeConfig) -> Self {
        PipelineBuilder::new(client, config.clone()).build()
    }

    /// Validate `config`, create its providers and build the pipeline.
    ///
    /// Missing credentials fail here, before any network call.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let registry = ProviderRegistry::with_defaults();
        let client = LlmClient::from_config(config, &registry)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn builder(client: Arc<LlmClient>, config: RuntimeConfig) -> PipelineBuilder {
        PipelineBuilder::new(client, config)
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    /// Run one question end to end.
    pub async fn run(&self, question: &str) -> Result<RunReport, PipelineError> {
        let question = Question::new(question)?;
        let started_at = Utc::now();
        let usage_before = self.client.usage();

        let answer = self.generator.generate(&question).await?;
        let claims = self.extractor.extract(&answer).await?;

        let outcome = if claims.is_empty() {
            tracing::warn!("No factual claims detected");
            RunOutcome::NoClaims
        } else {
            let results = self.verifier.verify_claims(&claims).await?;
            let assessment = self.aggregator.assess(&results);
            tracing::info!(
                hallucinated = assessment.hallucinated,
                supported = assessment.supported,
                unsupported = assessment.unsupported,
                "{}",
                assessment.banner()
            );
            RunOutcome::Assessed {
                results,
                assessment,
            }
        };

        Ok(RunReport {
            question,
            answer,
            claims,
            outcome,
            usage: self.client.usage().since(&usage_before),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Builder for swapping the reply parsers.
pub struct PipelineBuilder {
    client: Arc<LlmClient>,
    config: RuntimeConfig,
    claim_parser: Option<Arc<dyn ClaimParser>>,
    verdict_parser: Option<Arc<dyn VerdictParser>>,
}

impl PipelineBuilder {
    pub fn new(client: Arc<LlmClient>, config: RuntimeConfig) -> Self {
        Self {
            client,
            config,
            claim_parser: None,
            verdict_parser: None,
        }
    }

    pub fn claim_parser(mut self, parser: Arc<dyn ClaimParser>) -> Self {
        self.claim_parser = Some(parser);
        self
    }

    pub fn verdict_parser(mut self, parser: Arc<dyn VerdictParser>) -> Self {
        self.verdict_parser = Some(parser);
        self
    }

    pub fn build(self) -> Pipeline {
        let generator = AnswerGenerator::new(self.client.clone(), self.config.generator);

        let mut extractor = ClaimExtractor::new(self.client.clone(), self.config.extractor);
        if let Some(parser) = self.claim_parser {
            extractor = extractor.with_parser(parser);
        }

        let mut verifier = ClaimVerifier::new(self.client.clone(), self.config.verifier)
            .with_concurrency(self.config.verify_concurrency);
        if let Some(parser) = self.verdict_parser {
            verifier = verifier.with_parser(parser);
        }

        Pipeline {
            client: self.client,
            generator,
            extractor,
            verifier,
            aggregator: Aggregator::new(),
        }
    }
}
