// Partial-failure semantics: provider errors become diagnostics, never
// request failures. Only invalid input raises.
mod support;

use std::sync::Arc;

use career_aggregator::{
    FailureKind, ProviderAdapter, ProviderFailure, SearchQuery, ValidationError,
};
use support::{engine, job, FailingProvider, StaticProvider};

#[tokio::test]
async fn one_failing_provider_yields_one_error_and_keeps_the_rest() {
    let a = StaticProvider::jobs("alpha", vec![job("a:1", "Engineer", "Acme", "Nairobi", "alpha")]);
    let b = StaticProvider::jobs("beta", vec![job("b:1", "Analyst", "Beta Ltd", "Lagos", "beta")]);
    let c = StaticProvider::jobs("gamma", vec![job("c:1", "Designer", "Gamma Co", "Cairo", "gamma")]);
    let broken = FailingProvider::jobs(
        "delta",
        ProviderFailure::RateLimited("429 from upstream".into()),
    );

    let engine = engine(vec![
        a.clone() as Arc<dyn ProviderAdapter>,
        b as Arc<dyn ProviderAdapter>,
        c as Arc<dyn ProviderAdapter>,
        broken as Arc<dyn ProviderAdapter>,
    ]);

    let response = engine.search(&SearchQuery::jobs("engineer")).await.unwrap();

    assert_eq!(response.total, 3);
    assert_eq!(response.candidates.len(), 3);
    assert_eq!(response.sources_used.len(), 4);

    let errors = response.errors.expect("one provider failed");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source, "delta");
    assert_eq!(errors[0].kind, FailureKind::RateLimited);
}

#[tokio::test]
async fn all_providers_failing_still_returns_a_result() {
    let engine = engine(vec![
        FailingProvider::jobs("alpha", ProviderFailure::Unknown("boom".into()))
            as Arc<dyn ProviderAdapter>,
        FailingProvider::jobs("beta", ProviderFailure::MalformedResponse("bad json".into()))
            as Arc<dyn ProviderAdapter>,
    ]);

    let response = engine.search(&SearchQuery::jobs("engineer")).await.unwrap();

    // Zero results because every provider failed is distinguishable from
    // zero results because nothing matched: the error list is non-empty.
    assert_eq!(response.total, 0);
    assert!(response.candidates.is_empty());
    let errors = response.errors.expect("both providers failed");
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn invalid_input_is_the_only_hard_failure() {
    let a = StaticProvider::jobs("alpha", vec![]);
    let engine = engine(vec![a.clone() as Arc<dyn ProviderAdapter>]);

    let empty = SearchQuery::new(career_aggregator::SearchDomain::Jobs);
    assert_eq!(
        engine.search(&empty).await.unwrap_err(),
        ValidationError::EmptyQuery
    );
    // Validation happens before any fan-out.
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn explicit_source_subset_limits_the_fan_out() {
    let a = StaticProvider::jobs("alpha", vec![job("a:1", "Engineer", "Acme", "Nairobi", "alpha")]);
    let b = StaticProvider::jobs("beta", vec![job("b:1", "Engineer", "Beta Ltd", "Lagos", "beta")]);
    let engine = engine(vec![
        a.clone() as Arc<dyn ProviderAdapter>,
        b.clone() as Arc<dyn ProviderAdapter>,
    ]);

    let mut query = SearchQuery::jobs("engineer");
    query.sources = Some(vec!["ALPHA".into()]);
    let response = engine.search(&query).await.unwrap();

    assert_eq!(response.sources_used, vec!["alpha".to_string()]);
    assert_eq!(response.total, 1);
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 0);
}
