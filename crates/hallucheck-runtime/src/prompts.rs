//! System prompts and message builders for the three pipeline stages.
//!
//! Each stage sends exactly two messages: a fixed system prompt and one
//! user message carrying the dynamic content.

use crate::providers::ChatMessage;

/// Answer generation: a generic helpful assistant.
pub const GENERATOR_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Claim extraction: bullets only, nothing else.
pub const EXTRACTOR_SYSTEM_PROMPT: &str = "Extract all the factual claims from the answer. \n\
Return each claim as a bullet point. \n\
Do NOT add explanations.";

/// Claim verification: one word, TRUE or FALSE.
pub const VERIFIER_SYSTEM_PROMPT: &str = "Verify the factual accuracy of the claim. \n\
Reply with ONLY ONE WORD: TRUE or FALSE.";

/// Label prefixed to the claim in the verification request.
pub const CLAIM_LABEL: &str = "Claim:";

/// Messages for answering a question. The question is sent verbatim.
pub fn generation_messages(question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GENERATOR_SYSTEM_PROMPT),
        ChatMessage::user(question),
    ]
}

/// Messages for extracting claims from an answer.
pub fn extraction_messages(answer: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(EXTRACTOR_SYSTEM_PROMPT),
        ChatMessage::user(answer),
    ]
}

/// Messages for verifying one claim.
pub fn verification_messages(claim: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(VERIFIER_SYSTEM_PROMPT),
        ChatMessage::user(format!("{} {}", CLAIM_LABEL, claim)),
    ]
}
