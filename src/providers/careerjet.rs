use async_trait::async_trait;
use chrono::DateTime;
use metrics::counter;
use serde::Deserialize;

use crate::candidate::{Candidate, JobLocation, SalaryRange};
use crate::providers::types::{ProviderAdapter, ProviderFailure};
use crate::query::{SearchDomain, SearchQuery};

const API_URL: &str = "https://public.api.careerjet.net/search";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    jobs: Vec<CareerjetJob>,
}

#[derive(Debug, Deserialize)]
struct CareerjetJob {
    title: Option<String>,
    company: Option<String>,
    /// Comma-separated, e.g. "Nairobi, Kenya".
    locations: Option<String>,
    description: Option<String>,
    url: Option<String>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    salary_currency_code: Option<String>,
    /// RFC 3339 posting date.
    date: Option<String>,
}

/// Careerjet public search API.
pub struct CareerjetProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        api_key: String,
        client: reqwest::Client,
    },
}

impl CareerjetProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_api_key(api_key: String) -> Self {
        Self {
            mode: Mode::Http {
                url: API_URL.to_string(),
                api_key,
                client: reqwest::Client::new(),
            },
        }
    }

    fn split_location(raw: &str) -> JobLocation {
        let mut parts = raw.split(',').map(str::trim).filter(|p| !p.is_empty());
        let city = parts.next().map(str::to_string);
        let rest: Vec<&str> = parts.collect();
        let country = rest.last().map(|s| s.to_string());
        let state = if rest.len() > 1 {
            Some(rest[0].to_string())
        } else {
            None
        };
        JobLocation {
            city,
            state,
            country,
            remote: false,
        }
    }

    fn parse_body(body: &str) -> Result<Vec<Candidate>, ProviderFailure> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| ProviderFailure::MalformedResponse(e.to_string()))?;

        let mut out = Vec::with_capacity(envelope.jobs.len());
        for (idx, job) in envelope.jobs.into_iter().enumerate() {
            let Some(title) = job.title.filter(|t| !t.trim().is_empty()) else {
                continue;
            };

            let salary = if job.salary_min.is_some() || job.salary_max.is_some() {
                Some(SalaryRange {
                    min: job.salary_min,
                    max: job.salary_max,
                    currency: job.salary_currency_code,
                    period: None,
                })
            } else {
                None
            };

            let mut candidate = Candidate::new(format!("careerjet:{idx}"), title, "careerjet");
            candidate.description = job.description.unwrap_or_default();
            candidate.url = job.url;
            candidate.company = job.company;
            candidate.location = job.locations.as_deref().map(Self::split_location);
            candidate.salary = salary;
            candidate.posted_at = job
                .date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.timestamp());
            out.push(candidate);
        }

        counter!("provider_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ProviderAdapter for CareerjetProvider {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderFailure> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),

            Mode::Http {
                url,
                api_key,
                client,
            } => {
                let keywords = query.term.clone().unwrap_or_default();
                let location = query.filters.location.clone().unwrap_or_default();
                let response = client
                    .get(url)
                    .query(&[
                        ("affid", api_key.as_str()),
                        ("keywords", keywords.as_str()),
                        ("location", location.as_str()),
                        ("pagesize", "50"),
                    ])
                    .send()
                    .await
                    .map_err(ProviderFailure::from_reqwest)?;
                if response.status().as_u16() == 429 {
                    return Err(ProviderFailure::RateLimited(
                        "careerjet returned 429".into(),
                    ));
                }
                if !response.status().is_success() {
                    return Err(ProviderFailure::Unknown(format!(
                        "careerjet returned {}",
                        response.status()
                    )));
                }
                let body = response.text().await.map_err(ProviderFailure::from_reqwest)?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "careerjet"
    }

    fn domain(&self) -> SearchDomain {
        SearchDomain::Jobs
    }
}
