//! Report Service
//!
//! Runs one report request end to end: validate, discover people, fetch
//! each person's entries sequentially, aggregate. Nothing discovered here
//! outlives the request.

use reqwest::Client;

use super::aggregate::build_person_report;
use super::normalize::{extract_array, Person};
use super::types::{DailyReport, ReportError, ReportRequest};
use crate::config::DiscoveryConfig;
use crate::discovery::{
    build_auth_strategies, build_base_url_candidates, discover_people, fetch_time_entries,
    JsonFetcher,
};

/// Generates daily reports against the remote time-tracking API
#[derive(Clone)]
pub struct ReportService {
    client: Client,
    config: DiscoveryConfig,
}

impl ReportService {
    /// Create a service with its own HTTP client
    pub fn new(config: DiscoveryConfig) -> Result<Self, ReportError> {
        let client = Client::builder()
            .user_agent(concat!("tally/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Internal(e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    /// Create a service around an existing client
    pub fn with_client(client: Client, config: DiscoveryConfig) -> Self {
        Self { client, config }
    }

    /// Get the discovery configuration
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Build the daily report described by `request`.
    ///
    /// Input errors return before any network call. A failure to list
    /// people is fatal; a failure to fetch one person's entries only
    /// empties that person's report.
    pub async fn generate_report(&self, request: &ReportRequest) -> Result<DailyReport, ReportError> {
        let params = request.validate(self.config.default_shift_hours)?;

        let mut policy = self.config.retry_policy();
        if let Some(timeout) = params.timeout {
            policy = policy.with_timeout(timeout);
        }
        let fetcher = JsonFetcher::new(self.client.clone(), policy);

        let base_urls =
            build_base_url_candidates(params.base_url.as_deref(), &self.config.default_base_url);
        let strategies = build_auth_strategies(
            params.auth_mode.as_deref(),
            &params.api_key_id,
            &params.api_key_secret,
        );

        tracing::info!(
            date = %params.date_label,
            base_urls = base_urls.len(),
            auth_strategies = strategies.len(),
            "Generating report"
        );

        let discovery = discover_people(&fetcher, &base_urls, strategies).await?;
        let context = discovery.context;
        let people = extract_array(discovery.payload);

        let mut reports = Vec::with_capacity(people.len());
        let mut entries_endpoint = None;

        for record in &people {
            let Some(person) = Person::from_record(record) else {
                tracing::debug!("Skipping person record without an id");
                continue;
            };

            let records = match fetch_time_entries(&fetcher, &context, &person.id, &params.date_label).await {
                Some(result) => {
                    entries_endpoint.get_or_insert_with(|| result.endpoint.clone());
                    extract_array(result.json)
                }
                None => Vec::new(),
            };

            reports.push(build_person_report(
                &person,
                &records,
                params.date,
                params.shift_minutes,
            ));
        }

        tracing::info!(
            base_url = %context.base_url,
            people = reports.len(),
            "Report generated"
        );

        Ok(DailyReport {
            date: params.date_label,
            base_url: context.base_url,
            auth_strategy: context.auth_label.to_string(),
            people_endpoint: context.people_endpoint,
            entries_endpoint,
            people_count: reports.len(),
            reports,
        })
    }
}
