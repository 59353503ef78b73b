use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::candidate::{Candidate, JobLocation, SalaryRange};
use crate::providers::types::{ProviderAdapter, ProviderFailure};
use crate::query::{SearchDomain, SearchQuery};

const API_URL: &str = "https://jsearch.p.rapidapi.com/search";
const API_HOST: &str = "jsearch.p.rapidapi.com";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<JsearchJob>,
}

#[derive(Debug, Deserialize)]
struct JsearchJob {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    job_description: Option<String>,
    job_apply_link: Option<String>,
    job_city: Option<String>,
    job_state: Option<String>,
    job_country: Option<String>,
    #[serde(default)]
    job_is_remote: bool,
    job_employment_type: Option<String>,
    #[serde(default)]
    job_required_skills: Vec<String>,
    job_min_salary: Option<f64>,
    job_max_salary: Option<f64>,
    job_salary_currency: Option<String>,
    job_salary_period: Option<String>,
    job_posted_at_timestamp: Option<i64>,
}

/// Google-for-Jobs aggregator behind RapidAPI.
pub struct JsearchProvider {
    mode: Mode,
}

enum Mode {
    // Own copy of the payload so tests can pass any &str.
    Fixture(String),
    Http {
        url: String,
        api_key: String,
        client: reqwest::Client,
    },
}

impl JsearchProvider {
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

    fn parse_body(body: &str) -> Result<Vec<Candidate>, ProviderFailure> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| ProviderFailure::MalformedResponse(e.to_string()))?;

        let mut out = Vec::with_capacity(envelope.data.len());
        for job in envelope.data {
            // Keep whatever valid records the source returned; rows without a
            // usable title are skipped, not fatal.
            let Some(title) = job.job_title.filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            let native_id = job.job_id;
            let id = match &native_id {
                Some(id) => format!("jsearch:{id}"),
                None => format!("jsearch:{}", title.to_lowercase().replace(' ', "-")),
            };

            let salary = if job.job_min_salary.is_some() || job.job_max_salary.is_some() {
                Some(SalaryRange {
                    min: job.job_min_salary,
                    max: job.job_max_salary,
                    currency: job.job_salary_currency,
                    period: job.job_salary_period,
                })
            } else {
                None
            };

            let mut candidate = Candidate::new(id, title, "jsearch");
            candidate.description = job.job_description.unwrap_or_default();
            candidate.url = job.job_apply_link;
            candidate.company = job.employer_name;
            candidate.location = Some(JobLocation {
                city: job.job_city,
                state: job.job_state,
                country: job.job_country,
                remote: job.job_is_remote,
            });
            candidate.employment_type = job.job_employment_type;
            candidate.requirements = job.job_required_skills;
            candidate.salary = salary;
            candidate.posted_at = job.job_posted_at_timestamp;
            candidate.native_id = native_id;
            out.push(candidate);
        }

        counter!("provider_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ProviderAdapter for JsearchProvider {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderFailure> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_body(body),

            Mode::Http {
                url,
                api_key,
                client,
            } => {
                let mut term = query.term.clone().unwrap_or_default();
                if let Some(location) = &query.filters.location {
                    term = format!("{term} in {location}");
                }

                let mut request = client
                    .get(url)
                    .header("X-RapidAPI-Key", api_key)
                    .header("X-RapidAPI-Host", API_HOST)
                    .query(&[("query", term.as_str()), ("page", "1")]);
                if query.filters.remote == Some(true) {
                    request = request.query(&[("remote_jobs_only", "true")]);
                }
                if !query.filters.employment_types.is_empty() {
                    request = request.query(&[(
                        "employment_types",
                        query.filters.employment_types.join(",").as_str(),
                    )]);
                }

                let response = request.send().await.map_err(ProviderFailure::from_reqwest)?;
                if response.status().as_u16() == 429 {
                    return Err(ProviderFailure::RateLimited("jsearch returned 429".into()));
                }
                if !response.status().is_success() {
                    return Err(ProviderFailure::Unknown(format!(
                        "jsearch returned {}",
                        response.status()
                    )));
                }
                let body = response.text().await.map_err(ProviderFailure::from_reqwest)?;
                Self::parse_body(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "jsearch"
    }

    fn domain(&self) -> SearchDomain {
        SearchDomain::Jobs
    }
}
