// Shared test doubles: canned providers over the real adapter trait, plus
// engine builders with test-sized timeouts and TTLs.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use career_aggregator::{
    AggregationEngine, CacheStore, Candidate, EngineConfig, JobLocation, MemoryCache,
    ProviderAdapter, ProviderFailure, ProviderRegistry, SearchDomain, SearchQuery, TtlPolicy,
};

/// Adapter returning a fixed candidate list and counting invocations, so
/// tests can assert that cache hits never reach a provider.
pub struct StaticProvider {
    name: &'static str,
    domain: SearchDomain,
    candidates: Vec<Candidate>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(
        name: &'static str,
        domain: SearchDomain,
        candidates: Vec<Candidate>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            domain,
            candidates,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn jobs(name: &'static str, candidates: Vec<Candidate>) -> Arc<Self> {
        Self::new(name, SearchDomain::Jobs, candidates)
    }

    pub fn courses(name: &'static str, candidates: Vec<Candidate>) -> Arc<Self> {
        Self::new(name, SearchDomain::Courses, candidates)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for StaticProvider {
    async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Candidate>, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn domain(&self) -> SearchDomain {
        self.domain
    }
}

/// Adapter that always fails with a fixed classified failure.
pub struct FailingProvider {
    name: &'static str,
    domain: SearchDomain,
    failure: ProviderFailure,
}

impl FailingProvider {
    pub fn jobs(name: &'static str, failure: ProviderFailure) -> Arc<Self> {
        Arc::new(Self {
            name,
            domain: SearchDomain::Jobs,
            failure,
        })
    }
}

#[async_trait]
impl ProviderAdapter for FailingProvider {
    async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Candidate>, ProviderFailure> {
        Err(self.failure.clone())
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn domain(&self) -> SearchDomain {
        self.domain
    }
}

/// Adapter that never answers within any sane deadline.
pub struct HangingProvider {
    name: &'static str,
    domain: SearchDomain,
}

impl HangingProvider {
    pub fn jobs(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            domain: SearchDomain::Jobs,
        })
    }
}

#[async_trait]
impl ProviderAdapter for HangingProvider {
    async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<Candidate>, ProviderFailure> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn domain(&self) -> SearchDomain {
        self.domain
    }
}

pub fn job(id: &str, title: &str, company: &str, city: &str, source: &str) -> Candidate {
    let mut c = Candidate::new(id, title, source);
    c.company = Some(company.to_string());
    c.location = Some(JobLocation {
        city: Some(city.to_string()),
        state: None,
        country: None,
        remote: false,
    });
    c
}

pub fn course(id: &str, title: &str, rating: f32, reviews: u64, source: &str) -> Candidate {
    let mut c = Candidate::new(id, title, source);
    c.rating = Some(rating);
    c.review_count = Some(reviews);
    c
}

pub fn registry(providers: Vec<Arc<dyn ProviderAdapter>>) -> ProviderRegistry {
    providers
        .into_iter()
        .fold(ProviderRegistry::new(), |r, p| r.register(p))
}

/// Engine over a fresh default cache, with a short provider timeout.
pub fn engine(providers: Vec<Arc<dyn ProviderAdapter>>) -> AggregationEngine {
    engine_with_cache(providers, Arc::new(MemoryCache::new()))
}

pub fn engine_with_cache(
    providers: Vec<Arc<dyn ProviderAdapter>>,
    cache: Arc<dyn CacheStore>,
) -> AggregationEngine {
    AggregationEngine::new(
        registry(providers),
        cache,
        EngineConfig {
            provider_timeout: Duration::from_millis(250),
            max_page_size: 100,
        },
    )
}

/// Engine whose cache expires everything after `ttl`.
pub fn engine_with_ttl(
    providers: Vec<Arc<dyn ProviderAdapter>>,
    ttl: Duration,
) -> AggregationEngine {
    engine_with_cache(
        providers,
        Arc::new(MemoryCache::with_policy(TtlPolicy::uniform(ttl))),
    )
}
