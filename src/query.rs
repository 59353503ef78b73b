//! # Search Query
//! Immutable value object describing one logical search. It is built once by
//! the API layer (or a test), validated, and then only read: the engine
//! derives the cache key from it and hands it to every active adapter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::CacheType;

/// Which catalog a query runs against. Selects the provider set, the dedup
/// identity rule and the scoring path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDomain {
    Jobs,
    Courses,
}

impl SearchDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDomain::Jobs => "jobs",
            SearchDomain::Courses => "courses",
        }
    }
}

/// Structured filters. All optional; at least one must be set when the
/// free-text term is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employment_types: Vec<String>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.category.is_none()
            && self.level.is_none()
            && self.is_free.is_none()
            && self.remote.is_none()
            && self.employment_types.is_empty()
    }
}

/// Caller preference for where a job should be located.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPreference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Desired salary band used for the salary-overlap sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryExpectation {
    pub min: f64,
    pub max: f64,
}

/// Caller context for job ranking. Every field is optional; absent inputs
/// contribute a zero sub-score, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPreferences {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub industries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_salary: Option<SalaryExpectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationPreference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

impl MatchPreferences {
    pub fn is_empty(&self) -> bool {
        self.job_types.is_empty()
            && self.industries.is_empty()
            && self.expected_salary.is_none()
            && self.location.is_none()
            && self.skills.is_empty()
    }
}

/// Bad query shape. The only failure the engine raises directly to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("query needs a search term or at least one filter")]
    EmptyQuery,
    #[error("page must be >= 1")]
    InvalidPage,
    #[error("page_size must be within 1..={max}")]
    InvalidPageSize { max: usize },
}

/// One logical search across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub domain: SearchDomain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default)]
    pub filters: QueryFilters,
    /// Explicit provider subset; `None` means every registered adapter for
    /// the domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    pub page: usize,
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<MatchPreferences>,
}

impl SearchQuery {
    pub fn new(domain: SearchDomain) -> Self {
        Self {
            domain,
            term: None,
            filters: QueryFilters::default(),
            sources: None,
            page: 1,
            page_size: 20,
            preferences: None,
        }
    }

    pub fn jobs(term: impl Into<String>) -> Self {
        let mut q = Self::new(SearchDomain::Jobs);
        q.term = Some(term.into());
        q
    }

    pub fn courses(term: impl Into<String>) -> Self {
        let mut q = Self::new(SearchDomain::Courses);
        q.term = Some(term.into());
        q
    }

    fn term_trimmed(&self) -> Option<&str> {
        self.term.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Fail fast on malformed input; everything else in the pipeline is
    /// recoverable.
    pub fn validate(&self, max_page_size: usize) -> Result<(), ValidationError> {
        if self.term_trimmed().is_none() && self.filters.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if self.page < 1 {
            return Err(ValidationError::InvalidPage);
        }
        if self.page_size < 1 || self.page_size > max_page_size {
            return Err(ValidationError::InvalidPageSize { max: max_page_size });
        }
        Ok(())
    }

    /// TTL class for this query, derived from which filters are set.
    /// Free-course listings churn fastest, category browsing slowest.
    pub fn cache_type(&self) -> CacheType {
        if self.filters.is_free == Some(true) {
            CacheType::Free
        } else if self.filters.category.is_some() {
            CacheType::Category
        } else {
            CacheType::Search
        }
    }

    /// Canonical cache-key parameters. Pagination is deliberately excluded:
    /// one entry holds the full ranked list and every page slices it.
    /// `BTreeMap` (and serde_json's sorted maps) keep the serialization
    /// independent of argument order.
    pub fn cache_params(&self) -> BTreeMap<String, Value> {
        let mut params = BTreeMap::new();
        params.insert("domain".to_string(), Value::from(self.domain.as_str()));
        if let Some(term) = self.term_trimmed() {
            params.insert("term".to_string(), Value::from(term.to_lowercase()));
        }
        if let Some(loc) = &self.filters.location {
            params.insert("location".to_string(), Value::from(loc.to_lowercase()));
        }
        if let Some(cat) = &self.filters.category {
            params.insert("category".to_string(), Value::from(cat.to_lowercase()));
        }
        if let Some(level) = &self.filters.level {
            params.insert("level".to_string(), Value::from(level.to_lowercase()));
        }
        if let Some(free) = self.filters.is_free {
            params.insert("is_free".to_string(), Value::from(free));
        }
        if let Some(remote) = self.filters.remote {
            params.insert("remote".to_string(), Value::from(remote));
        }
        if !self.filters.employment_types.is_empty() {
            let mut types: Vec<String> = self
                .filters
                .employment_types
                .iter()
                .map(|t| t.to_lowercase())
                .collect();
            types.sort();
            params.insert("employment_types".to_string(), Value::from(types));
        }
        if let Some(sources) = &self.sources {
            let mut sources: Vec<String> =
                sources.iter().map(|s| s.to_lowercase()).collect();
            sources.sort();
            params.insert("sources".to_string(), Value::from(sources));
        }
        if let Some(prefs) = self.preferences.as_ref().filter(|p| !p.is_empty()) {
            // serde_json maps are sorted (preserve_order is off), so nested
            // preference objects stay canonical too.
            if let Ok(v) = serde_json::to_value(prefs) {
                params.insert("preferences".to_string(), v);
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_rejected() {
        let q = SearchQuery::new(SearchDomain::Jobs);
        assert_eq!(q.validate(100), Err(ValidationError::EmptyQuery));

        let mut blank_term = SearchQuery::jobs("   ");
        assert_eq!(blank_term.validate(100), Err(ValidationError::EmptyQuery));

        blank_term.filters.remote = Some(true);
        assert!(blank_term.validate(100).is_ok());
    }

    #[test]
    fn page_bounds_are_enforced() {
        let mut q = SearchQuery::jobs("rust");
        q.page = 0;
        assert_eq!(q.validate(100), Err(ValidationError::InvalidPage));

        q.page = 1;
        q.page_size = 0;
        assert_eq!(
            q.validate(100),
            Err(ValidationError::InvalidPageSize { max: 100 })
        );

        q.page_size = 101;
        assert_eq!(
            q.validate(100),
            Err(ValidationError::InvalidPageSize { max: 100 })
        );
    }

    #[test]
    fn cache_type_follows_filters() {
        let mut q = SearchQuery::courses("python");
        assert_eq!(q.cache_type(), CacheType::Search);

        q.filters.category = Some("Data Science".into());
        assert_eq!(q.cache_type(), CacheType::Category);

        q.filters.is_free = Some(true);
        assert_eq!(q.cache_type(), CacheType::Free);
    }

    #[test]
    fn cache_params_ignore_pagination_and_case() {
        let mut a = SearchQuery::jobs("Software Engineer");
        a.filters.location = Some("Nairobi, Kenya".into());
        a.page = 1;

        let mut b = a.clone();
        b.term = Some("software engineer".into());
        b.filters.location = Some("NAIROBI, KENYA".into());
        b.page = 3;
        b.page_size = 50;

        assert_eq!(a.cache_params(), b.cache_params());
    }

    #[test]
    fn cache_params_sort_list_filters() {
        let mut a = SearchQuery::jobs("engineer");
        a.sources = Some(vec!["jsearch".into(), "careerjet".into()]);
        let mut b = SearchQuery::jobs("engineer");
        b.sources = Some(vec!["careerjet".into(), "jsearch".into()]);
        assert_eq!(a.cache_params(), b.cache_params());
    }
}
