// In-process HTTP tests over the Axum router (oneshot, no sockets).
mod support;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

use career_aggregator::{create_router, AppState, ProviderAdapter};
use support::{engine, job, StaticProvider};

fn app() -> (Router, Arc<StaticProvider>) {
    let provider = StaticProvider::jobs(
        "alpha",
        vec![
            job("a:1", "Backend Engineer", "Acme", "Nairobi", "alpha"),
            job("a:2", "Data Engineer", "Beta Ltd", "Lagos", "alpha"),
        ],
    );
    let engine = engine(vec![provider.clone() as Arc<dyn ProviderAdapter>]);
    let router = create_router(AppState {
        engine: Arc::new(engine),
    });
    (router, provider)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request build"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _) = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn job_search_round_trips_and_reports_cached_flag() {
    let (app, provider) = app();

    let (status, body) = get_json(&app, "/api/jobs/search?q=engineer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["cached"], false);
    assert_eq!(body["page"], 1);
    assert!(body["errors"].is_null());
    assert_eq!(body["candidates"].as_array().unwrap().len(), 2);

    let (status, body) = get_json(&app, "/api/jobs/search?q=engineer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cached"], true);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn empty_query_is_a_400() {
    let (app, provider) = app();
    let (status, body) = get_json(&app, "/api/jobs/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("search term"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn page_size_out_of_bounds_is_a_400() {
    let (app, _) = app();
    let (status, _) = get_json(&app, "/api/jobs/search?q=engineer&page_size=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cache_stats_reflect_traffic() {
    let (app, _) = app();
    get_json(&app, "/api/jobs/search?q=engineer").await;
    get_json(&app, "/api/jobs/search?q=engineer").await;

    let (status, body) = get_json(&app, "/api/cache/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_entries"], 1);
    assert_eq!(body["active_entries"], 1);
    assert_eq!(body["total_hits"], 1);
    assert_eq!(body["per_type"][0]["cache_type"], "search");
}

#[tokio::test]
async fn invalidate_empties_the_cache() {
    let (app, provider) = app();
    get_json(&app, "/api/jobs/search?q=engineer").await;

    let (status, body) =
        post_json(&app, "/api/cache/invalidate", r#"{"cache_type":"search"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);

    // Next identical search must aggregate live again.
    let (_, body) = get_json(&app, "/api/jobs/search?q=engineer").await;
    assert_eq!(body["cached"], false);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn invalidate_rejects_unknown_cache_type() {
    let (app, _) = app();
    let (status, body) =
        post_json(&app, "/api/cache/invalidate", r#"{"cache_type":"bogus"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown cache type"));
}

#[tokio::test]
async fn sources_endpoint_lists_registered_adapters() {
    let (app, _) = app();
    let (status, body) = get_json(&app, "/api/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobs"], serde_json::json!(["alpha"]));
    assert_eq!(body["courses"], serde_json::json!([]));
}
