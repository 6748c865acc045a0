//! Discovery Orchestrator
//!
//! Two-phase discovery for one report request:
//!
//! 1. **People**: walk base URL candidates until one answers on a people
//!    alias. That base URL, auth strategy and endpoint become the fixed
//!    [`DiscoveryContext`] for the rest of the request.
//! 2. **Time entries**: per person, walk the query shapes against the
//!    resolved base URL with the full auth strategy set.

use serde_json::Value;
use thiserror::Error;

use super::candidates::{build_time_entry_param_sets, AuthStrategy};
use super::fetch::JsonFetcher;
use super::prober::{try_endpoints, ProbeRequest, ProbeResult};

/// Resource paths that may list people, in priority order
pub const PEOPLE_ENDPOINTS: &[&str] = &["/people", "/users", "/persons", "/members", "/staff"];

/// Resource paths that may list time entries, in priority order
pub const TIME_ENTRY_ENDPOINTS: &[&str] =
    &["/time_entries", "/time-entries", "/timesheets", "/entries"];

/// What the people phase resolved. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryContext {
    /// Base URL that answered the people probe
    pub base_url: String,
    /// Label of the strategy that worked for people
    pub auth_label: &'static str,
    /// People alias that answered
    pub people_endpoint: String,
    /// Every applicable strategy; time entries are probed with all of them
    pub auth_strategies: Vec<AuthStrategy>,
}

/// No base URL produced a people listing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{details}")]
pub struct DiscoveryFailure {
    /// Message of the last base URL attempt
    pub details: String,
    /// Every base URL candidate that was tried, in order
    pub tried_base_urls: Vec<String>,
}

/// Outcome of the people phase
#[derive(Debug, Clone, PartialEq)]
pub struct PeopleDiscovery {
    pub context: DiscoveryContext,
    /// Raw people payload, still in its response envelope
    pub payload: Value,
}

/// Find the first base URL that lists people.
pub async fn discover_people(
    fetcher: &JsonFetcher,
    base_urls: &[String],
    auth_strategies: Vec<AuthStrategy>,
) -> Result<PeopleDiscovery, DiscoveryFailure> {
    let mut tried = Vec::with_capacity(base_urls.len());
    let mut details = String::from("Unknown error");

    for base_url in base_urls {
        tried.push(base_url.clone());

        let request = ProbeRequest {
            base_url,
            auth_strategies: &auth_strategies,
            endpoints: PEOPLE_ENDPOINTS,
            params: &[],
        };

        match try_endpoints(fetcher, request).await {
            Ok(ProbeResult {
                endpoint,
                auth_label,
                json,
                ..
            }) => {
                tracing::info!(
                    base_url = %base_url,
                    auth = auth_label,
                    endpoint = %endpoint,
                    "Discovered people endpoint"
                );
                return Ok(PeopleDiscovery {
                    context: DiscoveryContext {
                        base_url: base_url.clone(),
                        auth_label,
                        people_endpoint: endpoint,
                        auth_strategies,
                    },
                    payload: json,
                });
            }
            Err(e) => {
                tracing::debug!(base_url = %base_url, error = %e, "Base URL rejected");
                details = e.to_string();
            }
        }
    }

    tracing::warn!(tried = tried.len(), details = %details, "People discovery exhausted");
    Err(DiscoveryFailure {
        details,
        tried_base_urls: tried,
    })
}

/// Fetch one person's entries for `date` using the resolved context.
///
/// Returns `None` when no query shape succeeds; callers treat that as an
/// empty entry list.
pub async fn fetch_time_entries(
    fetcher: &JsonFetcher,
    context: &DiscoveryContext,
    person_id: &str,
    date: &str,
) -> Option<ProbeResult> {
    for params in build_time_entry_param_sets(person_id, date) {
        let request = ProbeRequest {
            base_url: &context.base_url,
            auth_strategies: &context.auth_strategies,
            endpoints: TIME_ENTRY_ENDPOINTS,
            params: &params,
        };

        match try_endpoints(fetcher, request).await {
            Ok(result) => {
                tracing::debug!(
                    person_id,
                    endpoint = %result.endpoint,
                    auth = result.auth_label,
                    "Fetched time entries"
                );
                return Some(result);
            }
            Err(e) => {
                let shape: Vec<_> = params.iter().map(|(k, _)| *k).collect();
                tracing::debug!(person_id, ?shape, error = %e, "Query shape rejected");
            }
        }
    }

    tracing::warn!(person_id, "No time entry query shape succeeded, reporting no entries");
    None
}
