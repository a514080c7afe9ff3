//! API keys.
//!
//! Keys live in a [`SecretString`] from the moment they are read until the
//! bearer header is set. `Debug` and `Display` never show them, so a
//! credential can sit inside any logged or printed struct.
//!
//! A key is looked up in the provider's config block first (where CLI flags
//! also land), then in the provider's environment variable. Blank values
//! count as missing at both steps, which is what makes an empty key a
//! configuration error raised before any request.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Config block field holding the key.
pub const API_KEY_FIELD: &str = "api_key";

/// Where one provider's API key may be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    /// Shown in errors and redacted output, e.g. "OpenAI API key".
    pub label: &'static str,
    /// Consulted when the config block has no usable key.
    pub env_var: &'static str,
}

impl KeySpec {
    /// Whether a non-blank key can be found, without reading it into a secret.
    pub fn is_set(&self, config: &JsonValue) -> bool {
        from_block(config).is_some() || from_env(self.env_var).is_some()
    }

    pub(crate) fn missing(&self) -> ProviderError {
        ProviderError::NotConfigured(format!(
            "Missing {}: pass it in '{}' or set {}",
            self.label, API_KEY_FIELD, self.env_var
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Config file or command-line flag
    Config,
    Environment,
    /// Handed to a constructor directly
    Explicit,
}

impl CredentialSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Environment => "environment",
            Self::Explicit => "caller",
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API key plus where it came from.
pub struct ApiCredential {
    secret: SecretString,
    source: CredentialSource,
    label: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, label: &'static str) -> Self {
        Self {
            secret: SecretString::from(value.into()),
            source,
            label,
        }
    }

    /// Find the key described by `spec`: config block, then environment.
    pub fn resolve(config: &JsonValue, spec: &KeySpec) -> Result<Self, ProviderError> {
        if let Some(value) = from_block(config) {
            return Ok(Self::new(value, CredentialSource::Config, spec.label));
        }
        match from_env(spec.env_var) {
            Some(value) => Ok(Self::new(value, CredentialSource::Environment, spec.label)),
            None => Err(spec.missing()),
        }
    }

    /// The raw key. Call only where it is sent, and do not keep the result.
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

fn from_block(config: &JsonValue) -> Option<&str> {
    config[API_KEY_FIELD].as_str().filter(|v| !v.trim().is_empty())
}

fn from_env(env_var: &str) -> Option<String> {
    std::env::var(env_var).ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("label", &self.label)
            .field("source", &self.source)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): [REDACTED]", self.label, self.source)
    }
}
