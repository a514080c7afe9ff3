//! Resilience patterns for hallucheck-runtime.
//!
//! This module provides:
//! - Retry with backoff (off by default)
//! - Token usage accounting

mod retry;
mod usage;

pub use retry::RetryPolicy;
pub use usage::{LlmUsage, UsageTracker};
