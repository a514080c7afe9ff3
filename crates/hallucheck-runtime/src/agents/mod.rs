//! Pipeline stages that talk to a model.
//!
//! Each stage owns its [`StageConfig`](crate::config::StageConfig) and a
//! shared [`LlmClient`](crate::client::LlmClient); parsing of replies is
//! delegated to the deterministic parsers in `hallucheck-core`.

mod extractor;
mod generator;
mod verifier;

pub use extractor::ClaimExtractor;
pub use generator::AnswerGenerator;
pub use verifier::ClaimVerifier;
