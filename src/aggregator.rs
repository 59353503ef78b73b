//! # Aggregation Engine
//! The orchestrator: one logical query fans out to every active provider
//! adapter in parallel, the outcomes are merged through dedup and scoring,
//! the full ranked list is written through to the cache, and the caller gets
//! one page plus per-provider diagnostics.
//!
//! Failure policy: adapter failures are never fatal to a request (they become
//! `errors[]` rows), cache failures degrade to miss/uncached behavior, and
//! only malformed caller input is raised. A request with every provider down
//! still succeeds with an empty candidate list and a non-empty error list.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStore, CacheType};
use crate::candidate::Candidate;
use crate::dedup::dedupe;
use crate::providers::types::{
    ProviderAdapter, ProviderFailure, ProviderOutcome, SourceError,
};
use crate::providers::ProviderRegistry;
use crate::query::{SearchDomain, SearchQuery, ValidationError};
use crate::scoring::rank;

/// Assembled page returned for every aggregation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub candidates: Vec<Candidate>,
    /// Full deduplicated count, not the page length.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Adapters that were queried (or would have been, on a cache hit).
    pub sources_used: Vec<String>,
    /// Per-provider failures; `None` when every provider succeeded.
    pub errors: Option<Vec<SourceError>>,
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for one adapter call. The fan-in barrier therefore
    /// completes within roughly this bound regardless of how many providers
    /// hang.
    pub provider_timeout: Duration,
    pub max_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(12),
            max_page_size: 100,
        }
    }
}

/// Orchestrator over a fixed provider registry and an injected cache store.
pub struct AggregationEngine {
    registry: ProviderRegistry,
    cache: Arc<dyn CacheStore>,
    cfg: EngineConfig,
}

impl AggregationEngine {
    pub fn new(registry: ProviderRegistry, cache: Arc<dyn CacheStore>, cfg: EngineConfig) -> Self {
        Self {
            registry,
            cache,
            cfg,
        }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Registered adapter names for a domain, in registration order.
    pub fn available_sources(&self, domain: SearchDomain) -> Vec<&'static str> {
        self.registry.names_for_domain(domain)
    }

    /// Run one search: validate, then serve from cache or aggregate live.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, ValidationError> {
        query.validate(self.cfg.max_page_size)?;
        Ok(self.aggregate(query, query.cache_type()).await)
    }

    /// Featured listings for a domain; cached under the `featured` class.
    pub async fn featured(
        &self,
        domain: SearchDomain,
        limit: usize,
    ) -> Result<SearchResponse, ValidationError> {
        if limit < 1 || limit > self.cfg.max_page_size {
            return Err(ValidationError::InvalidPageSize {
                max: self.cfg.max_page_size,
            });
        }
        let mut query = SearchQuery::new(domain);
        query.page_size = limit;
        Ok(self.aggregate(&query, CacheType::Featured).await)
    }

    /// Recommendations built from the caller's top skills; cached under the
    /// `recommendations` class.
    pub async fn recommended(
        &self,
        domain: SearchDomain,
        skills: &[String],
        limit: usize,
    ) -> Result<SearchResponse, ValidationError> {
        let term = skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .take(3)
            .collect::<Vec<_>>()
            .join(" ");
        if term.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if limit < 1 || limit > self.cfg.max_page_size {
            return Err(ValidationError::InvalidPageSize {
                max: self.cfg.max_page_size,
            });
        }
        let mut query = SearchQuery::new(domain);
        query.term = Some(term);
        query.page_size = limit;
        Ok(self.aggregate(&query, CacheType::Recommendations).await)
    }

    /// Pre-populate the cache for a list of common queries. Returns how many
    /// of them completed (hit or freshly aggregated).
    pub async fn warm(&self, queries: &[SearchQuery]) -> usize {
        let mut warmed = 0usize;
        for query in queries {
            match self.search(query).await {
                Ok(_) => warmed += 1,
                Err(e) => tracing::warn!(error = %e, "skipping invalid warmup query"),
            }
        }
        tracing::info!(warmed, requested = queries.len(), "cache warmup finished");
        warmed
    }

    async fn aggregate(&self, query: &SearchQuery, cache_type: CacheType) -> SearchResponse {
        counter!("aggregate_requests_total").increment(1);
        let started = Instant::now();
        let params = query.cache_params();

        // Cache lookup. A store error degrades to always-miss: log, continue.
        match self.cache.get(cache_type, &params) {
            Ok(Some(hit)) => {
                let response = page_response(
                    hit.candidates,
                    hit.total,
                    query.page,
                    query.page_size,
                    hit.sources,
                    hit.errors,
                    true,
                );
                histogram!("aggregate_request_ms")
                    .record(started.elapsed().as_secs_f64() * 1_000.0);
                return response;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = ?e, "cache read failed; treating as miss");
            }
        }

        let adapters = self.active_adapters(query);
        let sources_used: Vec<String> =
            adapters.iter().map(|a| a.name().to_string()).collect();

        let outcomes = self.fan_out(&adapters, query).await;

        let mut collected: Vec<Candidate> = Vec::new();
        let mut errors: Vec<SourceError> = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(mut candidates) => collected.append(&mut candidates),
                Err(failure) => errors.push(SourceError::new(outcome.provider, &failure)),
            }
        }

        let unique = dedupe(query.domain, collected);
        let ranked = rank(query.domain, query.preferences.as_ref(), unique);
        let total = ranked.len();

        tracing::info!(
            domain = query.domain.as_str(),
            cache_type = cache_type.as_str(),
            providers = sources_used.len(),
            failed = errors.len(),
            total,
            "aggregated live result"
        );

        // Write-through of the full ranked list. A failing store must not
        // fail the request; the fresh result is simply served uncached.
        if let Err(e) = self.cache.set(
            cache_type,
            &params,
            ranked.clone(),
            total,
            sources_used.clone(),
            errors.clone(),
        ) {
            tracing::warn!(error = ?e, "cache write failed; serving uncached");
        }

        let response = page_response(
            ranked,
            total,
            query.page,
            query.page_size,
            sources_used,
            errors,
            false,
        );
        histogram!("aggregate_request_ms").record(started.elapsed().as_secs_f64() * 1_000.0);
        response
    }

    /// Providers for the query's domain, narrowed to the explicit subset when
    /// one was given. Unknown names in the subset are ignored.
    fn active_adapters(&self, query: &SearchQuery) -> Vec<Arc<dyn ProviderAdapter>> {
        let registered = self.registry.for_domain(query.domain);
        match &query.sources {
            Some(wanted) => registered
                .into_iter()
                .filter(|a| wanted.iter().any(|w| w.eq_ignore_ascii_case(a.name())))
                .collect(),
            None => registered,
        }
    }

    /// Fan-out/fan-in barrier. Every call is individually bounded by the
    /// provider timeout and mapped to an outcome: one slow provider never
    /// cancels the others, one failing provider never aborts the batch.
    /// `join_all` preserves registration order, which keeps the dedup
    /// tie-break deterministic. Dropping the returned future (caller
    /// disconnect or an outer deadline) drops every in-flight call with it.
    async fn fan_out(
        &self,
        adapters: &[Arc<dyn ProviderAdapter>],
        query: &SearchQuery,
    ) -> Vec<ProviderOutcome> {
        let calls = adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let query = query.clone();
            let limit = self.cfg.provider_timeout;
            async move {
                let started = Instant::now();
                let result = match tokio::time::timeout(limit, adapter.fetch(&query)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderFailure::Timeout),
                };
                histogram!("provider_fetch_ms")
                    .record(started.elapsed().as_secs_f64() * 1_000.0);
                if let Err(failure) = &result {
                    counter!("provider_errors_total").increment(1);
                    tracing::warn!(
                        provider = adapter.name(),
                        error = %failure,
                        "provider call failed"
                    );
                }
                ProviderOutcome {
                    provider: adapter.name(),
                    result,
                }
            }
        });
        futures::future::join_all(calls).await
    }
}

fn page_response(
    candidates: Vec<Candidate>,
    total: usize,
    page: usize,
    page_size: usize,
    sources_used: Vec<String>,
    errors: Vec<SourceError>,
    cached: bool,
) -> SearchResponse {
    let start = (page - 1).saturating_mul(page_size);
    let page_items: Vec<Candidate> = if start >= candidates.len() {
        Vec::new()
    } else {
        let end = (start + page_size).min(candidates.len());
        candidates[start..end].to_vec()
    };

    SearchResponse {
        candidates: page_items,
        total,
        page,
        page_size,
        total_pages: total.div_ceil(page_size.max(1)),
        sources_used,
        errors: if errors.is_empty() { None } else { Some(errors) },
        cached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("x:{i}"), format!("Job {i}"), "x"))
            .collect()
    }

    #[test]
    fn page_slicing_is_contiguous_and_bounded() {
        let list = candidates(5);

        let p1 = page_response(list.clone(), 5, 1, 2, vec![], vec![], false);
        assert_eq!(p1.candidates.len(), 2);
        assert_eq!(p1.candidates[0].id, "x:0");
        assert_eq!(p1.total, 5);
        assert_eq!(p1.total_pages, 3);

        let p3 = page_response(list.clone(), 5, 3, 2, vec![], vec![], false);
        assert_eq!(p3.candidates.len(), 1);
        assert_eq!(p3.candidates[0].id, "x:4");

        let past_end = page_response(list, 5, 9, 2, vec![], vec![], false);
        assert!(past_end.candidates.is_empty());
        assert_eq!(past_end.total, 5);
    }

    #[test]
    fn empty_errors_serialize_as_null() {
        let r = page_response(vec![], 0, 1, 20, vec![], vec![], false);
        assert!(r.errors.is_none());
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("errors").unwrap().is_null());
    }
}
