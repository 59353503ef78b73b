use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::candidate::Candidate;
use crate::providers::types::{ProviderAdapter, ProviderFailure};
use crate::query::{SearchDomain, SearchQuery};

const API_URL: &str = "https://www.udemy.com/api-2.0/courses/";
const COURSE_URL_PREFIX: &str = "https://www.udemy.com";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    results: Vec<UdemyCourse>,
}

#[derive(Debug, Deserialize)]
struct UdemyCourse {
    id: Option<u64>,
    title: Option<String>,
    headline: Option<String>,
    /// Site-relative path, e.g. "/course/learn-rust/".
    url: Option<String>,
    price: Option<String>,
    #[serde(default)]
    is_paid: bool,
    avg_rating: Option<f32>,
    num_reviews: Option<u64>,
    instructional_level: Option<String>,
    primary_category: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    title: Option<String>,
}

/// Parse Udemy's display price ("$19.99", "Free") into a number.
fn parse_price(raw: &str) -> Option<f64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// Udemy course catalog API.
pub struct UdemyProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        token: String,
        client: reqwest::Client,
    },
}

impl UdemyProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_token(token: String) -> Self {
        Self {
            mode: Mode::Http {
                url: API_URL.to_string(),
                token,
                client: reqwest::Client::new(),
            },
        }
    }

    fn parse_body(body: &str) -> Result<Vec<Candidate>, ProviderFailure> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| ProviderFailure::MalformedResponse(e.to_string()))?;

        let mut out = Vec::with_capacity(envelope.results.len());
        for course in envelope.results {
            let Some(title) = course.title.filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            let native_id = course.id.map(|id| id.to_string());
            let id = match &native_id {
                Some(id) => format!("udemy:{id}"),
                None => format!("udemy:{}", title.to_lowercase().replace(' ', "-")),
            };

            let mut candidate = Candidate::new(id, title, "udemy");
            candidate.description = course.headline.unwrap_or_default();
            candidate.url = course
                .url
                .map(|path| format!("{COURSE_URL_PREFIX}{path}"));
            candidate.rating = course.avg_rating;
            candidate.review_count = course.num_reviews;
            candidate.price = course.price.as_deref().and_then(parse_price);
            candidate.is_free = Some(!course.is_paid);
            candidate.level = course.instructional_level;
            candidate.category = course.primary_category.and_then(|c| c.title);
            candidate.native_id = native_id;
            out.push(candidate);
        }

        counter!("provider_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ProviderAdapter for UdemyProvider {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderFailure> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),

            Mode::Http { url, token, client } => {
                let mut request = client
                    .get(url)
                    .header("Authorization", format!("Basic {token}"))
                    .query(&[("page_size", "50"), ("ordering", "relevance")]);
                if let Some(term) = &query.term {
                    request = request.query(&[("search", term.as_str())]);
                }
                if let Some(category) = &query.filters.category {
                    request = request.query(&[("category", category.as_str())]);
                }
                if let Some(level) = &query.filters.level {
                    request = request.query(&[("instructional_level", level.as_str())]);
                }
                if query.filters.is_free == Some(true) {
                    request = request.query(&[("price", "price-free")]);
                }

                let response = request.send().await.map_err(ProviderFailure::from_reqwest)?;
                if response.status().as_u16() == 429 {
                    return Err(ProviderFailure::RateLimited("udemy returned 429".into()));
                }
                if !response.status().is_success() {
                    return Err(ProviderFailure::Unknown(format!(
                        "udemy returned {}",
                        response.status()
                    )));
                }
                let body = response.text().await.map_err(ProviderFailure::from_reqwest)?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "udemy"
    }

    fn domain(&self) -> SearchDomain {
        SearchDomain::Courses
    }
}
