// src/providers/types.rs
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::query::{SearchDomain, SearchQuery};

/// Classified adapter failure. Adapters map every error of their transport
/// into one of these; nothing else crosses the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderFailure {
    #[error("request timed out")]
    Timeout,
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    RateLimited,
    MalformedResponse,
    Unknown,
}

impl ProviderFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderFailure::Timeout => FailureKind::Timeout,
            ProviderFailure::RateLimited(_) => FailureKind::RateLimited,
            ProviderFailure::MalformedResponse(_) => FailureKind::MalformedResponse,
            ProviderFailure::Unknown(_) => FailureKind::Unknown,
        }
    }

    /// Classify a transport error from the shared HTTP client.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderFailure::Timeout
        } else if err.is_decode() {
            ProviderFailure::MalformedResponse(err.to_string())
        } else {
            ProviderFailure::Unknown(err.to_string())
        }
    }
}

/// One `errors[]` row in an aggregated response, attributable to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    pub source: String,
    pub kind: FailureKind,
    pub error: String,
}

impl SourceError {
    pub fn new(source: impl Into<String>, failure: &ProviderFailure) -> Self {
        Self {
            source: source.into(),
            kind: failure.kind(),
            error: failure.to_string(),
        }
    }
}

/// Result of one adapter invocation. Always materialized; provider failures
/// never propagate as panics or request-level errors.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider: &'static str,
    pub result: Result<Vec<Candidate>, ProviderFailure>,
}

/// The single contract the engine is closed over. Adapters are stateless
/// beyond their HTTP client and safe to retry; the engine enforces the
/// per-call timeout, so implementations only classify their own transport
/// and decode failures.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderFailure>;
    fn name(&self) -> &'static str;
    fn domain(&self) -> SearchDomain;
}
