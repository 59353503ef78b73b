use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::aggregator::{AggregationEngine, SearchResponse};
use crate::cache::CacheType;
use crate::query::{QueryFilters, SearchDomain, SearchQuery, ValidationError};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AggregationEngine>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/jobs/search", get(search_jobs))
        .route("/api/courses/search", get(search_courses))
        .route("/api/courses/featured", get(featured_courses))
        .route("/api/courses/recommended", get(recommended_courses))
        .route("/api/sources", get(list_sources))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache/invalidate", post(invalidate_cache))
        .route("/api/cache/clear-expired", post(clear_expired))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Request-level failure: 400 for bad query shape, 500 for a broken store.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    }
}

fn default_page() -> usize {
    1
}
fn default_page_size() -> usize {
    20
}
fn default_limit() -> usize {
    20
}

/// Split a comma-separated query value, dropping empty segments.
fn split_csv(raw: Option<&str>) -> Option<Vec<String>> {
    let items: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[derive(Deserialize)]
struct JobSearchParams {
    q: Option<String>,
    location: Option<String>,
    remote: Option<bool>,
    employment_types: Option<String>,
    sources: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
}

async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = SearchQuery {
        domain: SearchDomain::Jobs,
        term: params.q,
        filters: QueryFilters {
            location: params.location,
            remote: params.remote,
            employment_types: split_csv(params.employment_types.as_deref()).unwrap_or_default(),
            ..QueryFilters::default()
        },
        sources: split_csv(params.sources.as_deref()),
        page: params.page,
        page_size: params.page_size,
        preferences: None,
    };
    Ok(Json(state.engine.search(&query).await?))
}

#[derive(Deserialize)]
struct CourseSearchParams {
    q: Option<String>,
    category: Option<String>,
    level: Option<String>,
    is_free: Option<bool>,
    sources: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
}

async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseSearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = SearchQuery {
        domain: SearchDomain::Courses,
        term: params.q,
        filters: QueryFilters {
            category: params.category,
            level: params.level,
            is_free: params.is_free,
            ..QueryFilters::default()
        },
        sources: split_csv(params.sources.as_deref()),
        page: params.page,
        page_size: params.page_size,
        preferences: None,
    };
    Ok(Json(state.engine.search(&query).await?))
}

#[derive(Deserialize)]
struct FeaturedParams {
    #[serde(default = "default_limit")]
    limit: usize,
}

async fn featured_courses(
    State(state): State<AppState>,
    Query(params): Query<FeaturedParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    Ok(Json(
        state
            .engine
            .featured(SearchDomain::Courses, params.limit)
            .await?,
    ))
}

#[derive(Deserialize)]
struct RecommendedParams {
    skills: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

async fn recommended_courses(
    State(state): State<AppState>,
    Query(params): Query<RecommendedParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let skills = split_csv(params.skills.as_deref()).unwrap_or_default();
    Ok(Json(
        state
            .engine
            .recommended(SearchDomain::Courses, &skills, params.limit)
            .await?,
    ))
}

async fn list_sources(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "jobs": state.engine.available_sources(SearchDomain::Jobs),
        "courses": state.engine.available_sources(SearchDomain::Courses),
    }))
}

async fn cache_stats(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stats = state.engine.cache().stats()?;
    Ok(Json(stats).into_response())
}

#[derive(Deserialize)]
struct InvalidateRequest {
    cache_type: Option<String>,
    params: Option<BTreeMap<String, Value>>,
}

async fn invalidate_cache(
    State(state): State<AppState>,
    Json(body): Json<InvalidateRequest>,
) -> Result<Json<Value>, ApiError> {
    let cache_type = match body.cache_type.as_deref() {
        Some(raw) => Some(raw.parse::<CacheType>().map_err(|e| ApiError {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        })?),
        None => None,
    };
    let deleted = state
        .engine
        .cache()
        .invalidate(cache_type, body.params.as_ref())?;
    Ok(Json(json!({ "deleted": deleted })))
}

async fn clear_expired(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let deleted = state.engine.cache().clear_expired()?;
    Ok(Json(json!({ "deleted": deleted })))
}
