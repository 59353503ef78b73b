//! # Cache Store
//! Time-bounded result cache keyed by a content hash of the query signature.
//! Entries hold the *full* ranked candidate list for a signature, so every
//! page of the same query reuses one entry. Expiry is enforced lazily on
//! read and by a periodic sweep; there is no capacity bound (time-based
//! eviction only).

pub mod key;
pub mod sweeper;

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::candidate::Candidate;
use crate::providers::types::SourceError;

pub use key::cache_key;

/// TTL class of a cached query. Browse-style queries change least and are
/// requested most, so they keep the longest TTL; free-course listings churn
/// fastest and keep the shortest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    Search,
    Category,
    Free,
    Featured,
    Recommendations,
}

impl CacheType {
    pub const ALL: [CacheType; 5] = [
        CacheType::Search,
        CacheType::Category,
        CacheType::Free,
        CacheType::Featured,
        CacheType::Recommendations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Search => "search",
            CacheType::Category => "category",
            CacheType::Free => "free",
            CacheType::Featured => "featured",
            CacheType::Recommendations => "recommendations",
        }
    }

    /// Default TTL per class; deployments tune these via configuration.
    pub fn default_ttl(&self) -> Duration {
        match self {
            CacheType::Free => Duration::from_secs(6 * 3600),
            CacheType::Search => Duration::from_secs(12 * 3600),
            CacheType::Recommendations => Duration::from_secs(12 * 3600),
            CacheType::Category => Duration::from_secs(24 * 3600),
            CacheType::Featured => Duration::from_secs(24 * 3600),
        }
    }
}

impl FromStr for CacheType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(CacheType::Search),
            "category" => Ok(CacheType::Category),
            "free" => Ok(CacheType::Free),
            "featured" => Ok(CacheType::Featured),
            "recommendations" => Ok(CacheType::Recommendations),
            other => Err(anyhow::anyhow!("unknown cache type: {other}")),
        }
    }
}

/// Per-type TTLs, with the class defaults as the baseline.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    ttls: HashMap<CacheType, Duration>,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        let ttls = CacheType::ALL
            .iter()
            .map(|t| (*t, t.default_ttl()))
            .collect();
        Self { ttls }
    }
}

impl TtlPolicy {
    /// Same TTL for every class; mostly useful in tests.
    pub fn uniform(ttl: Duration) -> Self {
        let ttls = CacheType::ALL.iter().map(|t| (*t, ttl)).collect();
        Self { ttls }
    }

    pub fn with_override(mut self, cache_type: CacheType, ttl: Duration) -> Self {
        self.ttls.insert(cache_type, ttl);
        self
    }

    pub fn ttl_for(&self, cache_type: CacheType) -> Duration {
        self.ttls
            .get(&cache_type)
            .copied()
            .unwrap_or_else(|| cache_type.default_ttl())
    }
}

/// One stored result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cache_key: String,
    pub cache_type: CacheType,
    /// Original params, kept for diagnostics and param-scoped invalidation.
    pub params: BTreeMap<String, Value>,
    pub candidates: Vec<Candidate>,
    pub total: usize,
    pub sources: Vec<String>,
    pub errors: Vec<SourceError>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ttl_seconds: u64,
    pub hit_count: u64,
    pub last_accessed: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Snapshot handed back on a hit: the full ranked list plus the diagnostics
/// recorded at creation time.
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub candidates: Vec<Candidate>,
    pub total: usize,
    pub sources: Vec<String>,
    pub errors: Vec<SourceError>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeStats {
    pub cache_type: CacheType,
    pub entries: usize,
    pub hits: u64,
    pub avg_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularQuery {
    pub cache_type: CacheType,
    pub params: BTreeMap<String, Value>,
    pub hits: u64,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
    pub total_hits: u64,
    /// Fraction of reads served from cache since process start.
    pub hit_rate: f64,
    pub per_type: Vec<TypeStats>,
    pub popular_queries: Vec<PopularQuery>,
}

/// Storage contract the engine is injected with. Implementations must make
/// `set` an atomic upsert-by-key; the engine treats every `Err` as a miss
/// (reads) or logs and continues (writes), so a flaky store degrades to
/// always-miss behavior instead of failing requests.
pub trait CacheStore: Send + Sync {
    fn get(
        &self,
        cache_type: CacheType,
        params: &BTreeMap<String, Value>,
    ) -> Result<Option<CachedResult>>;

    #[allow(clippy::too_many_arguments)]
    fn set(
        &self,
        cache_type: CacheType,
        params: &BTreeMap<String, Value>,
        candidates: Vec<Candidate>,
        total: usize,
        sources: Vec<String>,
        errors: Vec<SourceError>,
    ) -> Result<()>;

    /// Delete entries by type and/or param subset; both `None` clears all.
    /// Returns the number of entries removed.
    fn invalidate(
        &self,
        cache_type: Option<CacheType>,
        params: Option<&BTreeMap<String, Value>>,
    ) -> Result<usize>;

    /// Drop every expired entry immediately. Returns the number removed.
    fn clear_expired(&self) -> Result<usize>;

    fn stats(&self) -> Result<CacheStats>;
}

/// In-memory store: one `RwLock`ed map with upsert-by-key semantics. Reads
/// of expired entries count as misses and delete the entry in place.
pub struct MemoryCache {
    inner: RwLock<HashMap<String, CacheEntry>>,
    policy: TtlPolicy,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_policy(TtlPolicy::default())
    }

    pub fn with_policy(policy: TtlPolicy) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("cache_misses_total").increment(1);
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn get(
        &self,
        cache_type: CacheType,
        params: &BTreeMap<String, Value>,
    ) -> Result<Option<CachedResult>> {
        let key = cache_key(cache_type, params);
        let now = Utc::now();

        let mut map = self.inner.write().expect("cache lock poisoned");
        let hit = match map.get_mut(&key) {
            Some(entry) if !entry.is_expired_at(now) => {
                entry.hit_count += 1;
                entry.last_accessed = now;
                Some(CachedResult {
                    candidates: entry.candidates.clone(),
                    total: entry.total,
                    sources: entry.sources.clone(),
                    errors: entry.errors.clone(),
                    created_at: entry.created_at,
                })
            }
            _ => None,
        };

        if let Some(result) = hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!("cache_hits_total").increment(1);
            tracing::debug!(cache_type = cache_type.as_str(), %key, "cache hit");
            return Ok(Some(result));
        }

        // Lazy expiry: an expired read is a miss and the entry goes.
        if map.remove(&key).is_some() {
            tracing::debug!(cache_type = cache_type.as_str(), %key, "cache expired");
        } else {
            tracing::debug!(cache_type = cache_type.as_str(), %key, "cache miss");
        }
        self.record_miss();
        Ok(None)
    }

    fn set(
        &self,
        cache_type: CacheType,
        params: &BTreeMap<String, Value>,
        candidates: Vec<Candidate>,
        total: usize,
        sources: Vec<String>,
        errors: Vec<SourceError>,
    ) -> Result<()> {
        let key = cache_key(cache_type, params);
        let ttl = self.policy.ttl_for(cache_type);
        let now = Utc::now();
        let entry = CacheEntry {
            cache_key: key.clone(),
            cache_type,
            params: params.clone(),
            candidates,
            total,
            sources,
            errors,
            created_at: now,
            expires_at: now + chrono::Duration::milliseconds(ttl.as_millis() as i64),
            ttl_seconds: ttl.as_secs(),
            hit_count: 0,
            last_accessed: now,
        };

        let mut map = self.inner.write().expect("cache lock poisoned");
        map.insert(key, entry);
        counter!("cache_writes_total").increment(1);
        Ok(())
    }

    fn invalidate(
        &self,
        cache_type: Option<CacheType>,
        params: Option<&BTreeMap<String, Value>>,
    ) -> Result<usize> {
        let mut map = self.inner.write().expect("cache lock poisoned");
        let before = map.len();
        map.retain(|_, entry| {
            if let Some(t) = cache_type {
                if entry.cache_type != t {
                    return true;
                }
            }
            if let Some(filter) = params {
                let matches = filter
                    .iter()
                    .all(|(k, v)| entry.params.get(k) == Some(v));
                if !matches {
                    return true;
                }
            }
            false
        });
        let deleted = before - map.len();
        tracing::info!(deleted, "cache invalidate");
        Ok(deleted)
    }

    fn clear_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut map = self.inner.write().expect("cache lock poisoned");
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired_at(now));
        let deleted = before - map.len();
        if deleted > 0 {
            counter!("cache_evictions_total").increment(deleted as u64);
        }
        Ok(deleted)
    }

    fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now();
        let map = self.inner.read().expect("cache lock poisoned");

        let total_entries = map.len();
        let active: Vec<&CacheEntry> =
            map.values().filter(|e| !e.is_expired_at(now)).collect();
        let active_entries = active.len();

        let mut per_type = Vec::new();
        for t in CacheType::ALL {
            let of_type: Vec<&&CacheEntry> =
                active.iter().filter(|e| e.cache_type == t).collect();
            if of_type.is_empty() {
                continue;
            }
            let hits = of_type.iter().map(|e| e.hit_count).sum();
            let avg_ttl = of_type.iter().map(|e| e.ttl_seconds).sum::<u64>()
                / of_type.len() as u64;
            per_type.push(TypeStats {
                cache_type: t,
                entries: of_type.len(),
                hits,
                avg_ttl_seconds: avg_ttl,
            });
        }

        let mut popular: Vec<&&CacheEntry> = active.iter().collect();
        popular.sort_by(|a, b| b.hit_count.cmp(&a.hit_count));
        let popular_queries = popular
            .into_iter()
            .take(10)
            .map(|e| PopularQuery {
                cache_type: e.cache_type,
                params: e.params.clone(),
                hits: e.hit_count,
                cached_at: e.created_at,
            })
            .collect();

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let reads = hits + misses;
        let hit_rate = if reads > 0 {
            hits as f64 / reads as f64
        } else {
            0.0
        };

        Ok(CacheStats {
            total_entries,
            active_entries,
            expired_entries: total_entries - active_entries,
            total_hits: hits,
            hit_rate,
            per_type,
            popular_queries,
        })
    }
}
