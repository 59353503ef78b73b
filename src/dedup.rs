//! # Deduplicator
//! Collapses candidates that describe the same real-world entity across
//! providers. First seen wins: the caller hands candidates in
//! provider-registration order, then provider-returned order, which makes the
//! surviving record deterministic for identical inputs.

use std::collections::HashSet;

use crate::candidate::Candidate;
use crate::query::SearchDomain;

/// Lowercase, trim and collapse inner whitespace. Identity fields from
/// different providers rarely agree on spacing or casing.
fn normalize_part(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Natural identity key for a candidate, or `None` when the identity-bearing
/// fields are missing. Keyless candidates are dropped rather than risking a
/// false merge.
///
/// Jobs: title + employer + location (city/state slots stay empty when
/// unknown). Courses: normalized title, falling back to the provider-native
/// id for title-less records.
pub fn identity_key(domain: SearchDomain, candidate: &Candidate) -> Option<String> {
    match domain {
        SearchDomain::Jobs => {
            let title = normalize_part(&candidate.title);
            let company = normalize_part(candidate.company.as_deref()?);
            if title.is_empty() || company.is_empty() {
                return None;
            }
            let (city, state) = match &candidate.location {
                Some(loc) => (
                    normalize_part(loc.city.as_deref().unwrap_or_default()),
                    normalize_part(loc.state.as_deref().unwrap_or_default()),
                ),
                None => (String::new(), String::new()),
            };
            Some(format!("{title}|{company}|{city}|{state}"))
        }
        SearchDomain::Courses => {
            let title = normalize_part(&candidate.title);
            if !title.is_empty() {
                return Some(title);
            }
            candidate
                .native_id
                .as_deref()
                .map(normalize_part)
                .filter(|id| !id.is_empty())
        }
    }
}

/// Drop duplicates (and identity-less records), keeping input order.
pub fn dedupe(domain: SearchDomain, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    let mut unique = Vec::with_capacity(candidates.len());
    let mut dropped = 0usize;

    for candidate in candidates {
        match identity_key(domain, &candidate) {
            Some(key) => {
                if seen.insert(key) {
                    unique.push(candidate);
                } else {
                    dropped += 1;
                }
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, kept = unique.len(), "deduplicated candidates");
    }
    unique
}
