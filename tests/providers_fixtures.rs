// Fixture-driven adapter tests: each provider parses its source's JSON shape
// into normalized candidates and classifies decode failures.
use std::fs;

use career_aggregator::providers::careerjet::CareerjetProvider;
use career_aggregator::providers::jsearch::JsearchProvider;
use career_aggregator::providers::udemy::UdemyProvider;
use career_aggregator::{ProviderAdapter, ProviderFailure, SearchQuery};

#[tokio::test]
async fn jsearch_fixture_parses_and_skips_untitled_rows() {
    let body = fs::read_to_string("tests/fixtures/jsearch_jobs.json")
        .expect("missing tests/fixtures/jsearch_jobs.json");
    let provider = JsearchProvider::from_fixture_str(&body);

    let jobs = provider.fetch(&SearchQuery::jobs("engineer")).await.unwrap();
    assert_eq!(jobs.len(), 2, "the untitled row must be skipped");

    let first = &jobs[0];
    assert_eq!(first.id, "jsearch:8146Xq0AAbcD");
    assert_eq!(first.source, "jsearch");
    assert_eq!(first.company.as_deref(), Some("Safarilink Technologies"));
    assert_eq!(first.employment_type.as_deref(), Some("FULLTIME"));
    assert_eq!(first.requirements.len(), 3);
    let salary = first.salary.as_ref().expect("salary present");
    assert_eq!(salary.bounds(), Some((90_000.0, 140_000.0)));
    assert_eq!(first.posted_at, Some(1_722_556_800));

    let second = &jobs[1];
    assert!(second.location.as_ref().is_some_and(|l| l.remote));
    assert!(second.salary.is_none());
}

#[tokio::test]
async fn careerjet_fixture_parses_locations_and_dates() {
    let body = fs::read_to_string("tests/fixtures/careerjet_jobs.json")
        .expect("missing tests/fixtures/careerjet_jobs.json");
    let provider = CareerjetProvider::from_fixture_str(&body);

    let jobs = provider.fetch(&SearchQuery::jobs("engineer")).await.unwrap();
    assert_eq!(jobs.len(), 2);

    let nairobi = &jobs[0];
    let loc = nairobi.location.as_ref().expect("location parsed");
    assert_eq!(loc.city.as_deref(), Some("Nairobi"));
    assert_eq!(loc.country.as_deref(), Some("Kenya"));
    assert!(nairobi.posted_at.is_some());

    let austin = &jobs[1];
    let loc = austin.location.as_ref().expect("location parsed");
    assert_eq!(loc.state.as_deref(), Some("TX"));
}

#[tokio::test]
async fn udemy_fixture_parses_course_fields() {
    let body = fs::read_to_string("tests/fixtures/udemy_courses.json")
        .expect("missing tests/fixtures/udemy_courses.json");
    let provider = UdemyProvider::from_fixture_str(&body);

    let courses = provider
        .fetch(&SearchQuery::courses("rust"))
        .await
        .unwrap();
    assert_eq!(courses.len(), 2, "the untitled row must be skipped");

    let paid = &courses[0];
    assert_eq!(paid.id, "udemy:567828");
    assert_eq!(paid.native_id.as_deref(), Some("567828"));
    assert_eq!(paid.price, Some(19.99));
    assert_eq!(paid.is_free, Some(false));
    assert_eq!(paid.rating, Some(4.7));
    assert_eq!(paid.review_count, Some(48_213));
    assert_eq!(paid.category.as_deref(), Some("Development"));
    assert_eq!(
        paid.url.as_deref(),
        Some("https://www.udemy.com/course/complete-rust/")
    );

    let free = &courses[1];
    assert_eq!(free.is_free, Some(true));
    assert_eq!(free.price, None);
}

#[tokio::test]
async fn malformed_body_is_classified_not_propagated() {
    let provider = JsearchProvider::from_fixture_str("{ definitely not json ]");
    let err = provider
        .fetch(&SearchQuery::jobs("engineer"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderFailure::MalformedResponse(_)));
}
