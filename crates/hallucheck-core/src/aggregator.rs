//! Aggregator: reduces per-claim verdicts into one hallucination flag.
//!
//! The policy is conjunctive trust and is not configurable:
//! 1. If ANY claim is FALSE → the answer is a hallucination
//! 2. Else → the answer appears factual
//!
//! An empty result set is vacuously factual. The pipeline never reaches
//! the aggregator with zero claims, but the function is still defined there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Verdict, VerificationResult};

/// Returns true iff at least one result has verdict FALSE.
pub fn decide(results: &[VerificationResult]) -> bool {
    results.iter().any(|r| r.verdict == Verdict::False)
}

/// Summary of one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Final flag, see [`decide`]
    pub hallucinated: bool,

    /// Claims verified TRUE
    pub supported: usize,

    /// Claims verified FALSE
    pub unsupported: usize,

    /// When the aggregation ran
    pub assessed_at: DateTime<Utc>,
}

impl Assessment {
    /// Human-facing banner for the final verdict.
    pub fn banner(&self) -> &'static str {
        if self.hallucinated {
            "Hallucination detected"
        } else {
            "Answer appears factual"
        }
    }
}

/// The Aggregator turns verification results into an [`Assessment`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate verification results. Pure; performs no I/O.
    pub fn assess(&self, results: &[VerificationResult]) -> Assessment {
        let supported = results.iter().filter(|r| r.verdict.is_true()).count();
        let hallucinated = decide(results);

        tracing::debug!(
            total = results.len(),
            supported,
            hallucinated,
            "Aggregated claim verdicts"
        );

        Assessment {
            hallucinated,
            supported,
            unsupported: results.len() - supported,
            assessed_at: Utc::now(),
        }
    }
}
