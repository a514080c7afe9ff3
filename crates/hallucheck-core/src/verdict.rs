//! Verdict normalization for free-text verifier replies.
//!
//! Policy is fail-closed: anything that does not affirm the claim is FALSE.
//!
//! The reply is upper-cased and searched for `TRUE` first, then `FALSE`.
//! A reply mentioning both words (e.g. one quoting "is this FALSE or TRUE?")
//! therefore resolves to TRUE. This tie-break is intentional and must not
//! be inverted without changing the documented behavior.

use crate::types::Verdict;

/// Turns a raw verifier reply into a [`Verdict`].
///
/// Implementations must be total: every input maps to TRUE or FALSE.
pub trait VerdictParser: Send + Sync {
    fn parse(&self, reply: &str) -> Verdict;
}

/// Substring-containment parser tolerant of verbose replies
/// such as "The answer is TRUE."
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordVerdictParser;

impl KeywordVerdictParser {
    pub fn new() -> Self {
        Self
    }
}

impl VerdictParser for KeywordVerdictParser {
    fn parse(&self, reply: &str) -> Verdict {
        let upper = reply.to_uppercase();
        if upper.contains("TRUE") {
            Verdict::True
        } else if upper.contains("FALSE") {
            Verdict::False
        } else {
            tracing::debug!("Verifier reply had no verdict keyword, defaulting to FALSE");
            Verdict::False
        }
    }
}

/// Normalize a verifier reply with the default [`KeywordVerdictParser`].
pub fn normalize_verdict(reply: &str) -> Verdict {
    KeywordVerdictParser.parse(reply)
}
