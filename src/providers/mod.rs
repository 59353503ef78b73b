// src/providers/mod.rs
pub mod careerjet;
pub mod jsearch;
pub mod types;
pub mod udemy;

use std::sync::Arc;

use crate::query::SearchDomain;
use crate::providers::types::ProviderAdapter;

/// Ordered set of registered adapters. Registration order is load-bearing:
/// it is the dedup tie-break order, so the same registry always yields the
/// same aggregated result for the same provider outputs.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Adapters serving `domain`, in registration order.
    pub fn for_domain(&self, domain: SearchDomain) -> Vec<Arc<dyn ProviderAdapter>> {
        self.adapters
            .iter()
            .filter(|a| a.domain() == domain)
            .cloned()
            .collect()
    }

    /// Registered adapter names for `domain`, in registration order.
    pub fn names_for_domain(&self, domain: SearchDomain) -> Vec<&'static str> {
        self.adapters
            .iter()
            .filter(|a| a.domain() == domain)
            .map(|a| a.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
