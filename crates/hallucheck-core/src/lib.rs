//! # hallucheck-core
//!
//! Deterministic building blocks for LLM hallucination checks.
//!
//! This crate owns everything in the pipeline that does not talk to a model:
//! - Question validation
//! - Parsing a bullet-formatted extraction reply into claims
//! - Normalizing a free-text verifier reply into a TRUE/FALSE verdict
//! - Aggregating per-claim verdicts into a single hallucination flag
//!
//! ## Key Guarantees
//!
//! 1. **No LLM calls**: All logic here is pure string and list processing
//! 2. **Fail-closed**: Verifier replies that do not affirm a claim are FALSE
//! 3. **Order-preserving**: Claims keep the order the model listed them in
//!
//! ## Example
//!
//! ```rust
//! use hallucheck_core::{decide, normalize_verdict, parse_claims, VerificationResult};
//!
//! let claims = parse_claims("- Bell invented the telephone.\n- It was patented in 1876.");
//! let results: Vec<_> = claims
//!     .into_iter()
//!     .zip(["TRUE", "FALSE, the year is disputed"])
//!     .map(|(claim, reply)| VerificationResult::new(claim, normalize_verdict(reply)))
//!     .collect();
//!
//! assert!(decide(&results));
//! ```

pub mod aggregator;
pub mod claims;
pub mod types;
pub mod verdict;

// Re-export main types at crate root
pub use aggregator::{decide, Aggregator, Assessment};
pub use claims::{parse_claims, BulletClaimParser, ClaimParser};
pub use types::{Answer, Claim, Question, Verdict, VerificationResult};
pub use verdict::{normalize_verdict, KeywordVerdictParser, VerdictParser};

use thiserror::Error;

/// Errors raised at the input boundary.
///
/// These are informational: the run stops before any model is called.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Enter a question to start.")]
    EmptyQuestion,
}
