//! # Scorer
//! Pure ranking logic: one composite score per candidate, a descending sort,
//! and a stable tie-break (the deduplicator's input order), so identical
//! inputs always produce byte-identical output order.
//!
//! Jobs use a fixed-weight sum of independently normalized [0,1] sub-scores
//! against the caller's preferences. Courses blend normalized rating with a
//! log-damped review-count term so a handful of five-star reviews cannot
//! outrank a widely-reviewed strong course.

use std::cmp::Ordering;

use crate::candidate::Candidate;
use crate::query::{MatchPreferences, SearchDomain};

// Job sub-score weights; they sum to 1.0.
const W_JOB_TYPE: f32 = 0.25;
const W_INDUSTRY: f32 = 0.20;
const W_SALARY: f32 = 0.30;
const W_LOCATION: f32 = 0.15;
const W_SKILLS: f32 = 0.10;

/// Remote postings score most of the location weight even when the cities
/// don't line up.
const REMOTE_LOCATION_FACTOR: f32 = 0.8;

/// Review counts at or above this saturate the popularity term.
const REVIEW_SATURATION: f64 = 10_000.0;

fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn contains_ignore_case(haystack: &[String], needle: &str) -> bool {
    haystack.iter().any(|h| eq_ignore_case(h, needle))
}

/// Fractional overlap between the candidate's salary range and the desired
/// band, relative to the desired band. Disjoint ranges score 0.
fn salary_overlap(prefs: &MatchPreferences, candidate: &Candidate) -> f32 {
    let Some(expected) = prefs.expected_salary else {
        return 0.0;
    };
    let Some((job_lo, job_hi)) = candidate.salary.as_ref().and_then(|s| s.bounds()) else {
        return 0.0;
    };
    let (want_lo, want_hi) = (expected.min.min(expected.max), expected.min.max(expected.max));
    if job_hi < want_lo || job_lo > want_hi {
        return 0.0;
    }
    let overlap = job_hi.min(want_hi) - job_lo.max(want_lo);
    if want_hi > want_lo {
        clamp01((overlap / (want_hi - want_lo)) as f32)
    } else {
        // Point expectation inside the candidate's range.
        1.0
    }
}

fn location_match(prefs: &MatchPreferences, candidate: &Candidate) -> f32 {
    let (Some(want), Some(have)) = (prefs.location.as_ref(), candidate.location.as_ref()) else {
        return 0.0;
    };
    let city_ok = match (want.city.as_deref(), have.city.as_deref()) {
        (Some(w), Some(h)) => eq_ignore_case(w, h),
        (None, _) => true,
        _ => false,
    };
    let state_ok = match (want.state.as_deref(), have.state.as_deref()) {
        (Some(w), Some(h)) => eq_ignore_case(w, h),
        (None, _) => true,
        _ => false,
    };
    if city_ok && state_ok && (want.city.is_some() || want.state.is_some()) {
        1.0
    } else if have.remote {
        REMOTE_LOCATION_FACTOR
    } else {
        0.0
    }
}

/// Fraction of the caller's skills present in the candidate's requirements.
fn skill_overlap(prefs: &MatchPreferences, candidate: &Candidate) -> f32 {
    if prefs.skills.is_empty() || candidate.requirements.is_empty() {
        return 0.0;
    }
    let matched = prefs
        .skills
        .iter()
        .filter(|s| contains_ignore_case(&candidate.requirements, s))
        .count();
    clamp01(matched as f32 / prefs.skills.len() as f32)
}

/// Weighted composite match score for a job candidate. Sub-scores with
/// absent inputs on either side contribute 0.
pub fn job_score(prefs: Option<&MatchPreferences>, candidate: &Candidate) -> f32 {
    let Some(prefs) = prefs else { return 0.0 };

    let mut score = 0.0f32;

    if let Some(job_type) = candidate.employment_type.as_deref() {
        if contains_ignore_case(&prefs.job_types, job_type) {
            score += W_JOB_TYPE;
        }
    }
    if let Some(industry) = candidate.industry.as_deref() {
        if contains_ignore_case(&prefs.industries, industry) {
            score += W_INDUSTRY;
        }
    }
    score += W_SALARY * salary_overlap(prefs, candidate);
    score += W_LOCATION * location_match(prefs, candidate);
    score += W_SKILLS * skill_overlap(prefs, candidate);

    clamp01(score)
}

/// Rating/popularity blend for a course candidate, weighted 50/50.
pub fn course_score(candidate: &Candidate) -> f32 {
    let rating = clamp01(candidate.rating.unwrap_or(0.0) / 5.0);
    let reviews = candidate.review_count.unwrap_or(0) as f64;
    let popularity = ((1.0 + reviews).ln() / (1.0 + REVIEW_SATURATION).ln()) as f32;
    0.5 * rating + 0.5 * clamp01(popularity)
}

/// Composite score for either domain.
pub fn composite_score(
    domain: SearchDomain,
    prefs: Option<&MatchPreferences>,
    candidate: &Candidate,
) -> f32 {
    match domain {
        SearchDomain::Jobs => job_score(prefs, candidate),
        SearchDomain::Courses => course_score(candidate),
    }
}

/// Sort descending by composite score. `sort_by` is stable, so ties keep the
/// deduplicator's input order and the total order is reproducible.
pub fn rank(
    domain: SearchDomain,
    prefs: Option<&MatchPreferences>,
    candidates: Vec<Candidate>,
) -> Vec<Candidate> {
    let mut scored: Vec<(f32, Candidate)> = candidates
        .into_iter()
        .map(|c| (composite_score(domain, prefs, &c), c))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, c)| c).collect()
}
