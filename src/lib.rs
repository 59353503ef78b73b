// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod candidate;
pub mod config;
pub mod dedup;
pub mod metrics;
pub mod providers;
pub mod query;
pub mod scoring;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{AggregationEngine, EngineConfig, SearchResponse};
pub use crate::api::{create_router, AppState};
pub use crate::cache::{CacheStore, CacheType, MemoryCache, TtlPolicy};
pub use crate::candidate::{Candidate, JobLocation, SalaryRange};
pub use crate::providers::types::{
    FailureKind, ProviderAdapter, ProviderFailure, ProviderOutcome, SourceError,
};
pub use crate::providers::ProviderRegistry;
pub use crate::query::{
    MatchPreferences, QueryFilters, SearchDomain, SearchQuery, ValidationError,
};
