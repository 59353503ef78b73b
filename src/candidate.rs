//! # Candidate
//! The normalized result record shared by every provider adapter, regardless
//! of whether it originated as a job posting or a course listing. Domain
//! specific fields are optional; adapters fill in what their source exposes.

use serde::{Deserialize, Serialize};

/// Salary or price band as reported by a provider. Open-ended ranges keep the
/// known bound and leave the other side `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

impl SalaryRange {
    /// Effective `(low, high)` bounds, falling back to the single known bound
    /// for open-ended ranges. `None` when the range carries no numbers at all.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => Some((lo.min(hi), lo.max(hi))),
            (Some(lo), None) => Some((lo, lo)),
            (None, Some(hi)) => Some((hi, hi)),
            (None, None) => None,
        }
    }
}

/// Structured job location. `remote` is set when the source marks the posting
/// as remote-friendly, independent of city/state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub remote: bool,
}

/// One normalized record from any provider.
///
/// `id` is provider-qualified (e.g. `jsearch:8146…`); `source` names the
/// adapter that produced the record and is carried through dedup, scoring and
/// the cache so diagnostics can always attribute a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: String,

    // Job fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<JobLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryRange>,
    /// Unix seconds when the posting was published or last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<i64>,

    // Course fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Id in the provider's own namespace, when the source exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_id: Option<String>,
}

impl Candidate {
    /// Minimal constructor; adapters fill in the domain fields they have.
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            url: None,
            source: source.into(),
            company: None,
            location: None,
            employment_type: None,
            industry: None,
            requirements: Vec::new(),
            salary: None,
            posted_at: None,
            rating: None,
            review_count: None,
            price: None,
            is_free: None,
            level: None,
            category: None,
            native_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_bounds_handle_open_ranges() {
        let both = SalaryRange {
            min: Some(50_000.0),
            max: Some(80_000.0),
            currency: None,
            period: None,
        };
        assert_eq!(both.bounds(), Some((50_000.0, 80_000.0)));

        let only_min = SalaryRange {
            min: Some(60_000.0),
            max: None,
            currency: None,
            period: None,
        };
        assert_eq!(only_min.bounds(), Some((60_000.0, 60_000.0)));

        let empty = SalaryRange {
            min: None,
            max: None,
            currency: None,
            period: None,
        };
        assert_eq!(empty.bounds(), None);
    }

    #[test]
    fn salary_bounds_reorder_inverted_input() {
        let inverted = SalaryRange {
            min: Some(90_000.0),
            max: Some(70_000.0),
            currency: None,
            period: None,
        };
        assert_eq!(inverted.bounds(), Some((70_000.0, 90_000.0)));
    }
}
