//! Endpoint Prober
//!
//! Walks endpoint paths × auth strategies against one base URL and stops at
//! the first combination that answers successfully.

use serde_json::Value;

use super::candidates::AuthStrategy;
use super::error::FetchError;
use super::fetch::JsonFetcher;

/// Inputs for one probe sequence
#[derive(Debug, Clone, Copy)]
pub struct ProbeRequest<'a> {
    pub base_url: &'a str,
    pub auth_strategies: &'a [AuthStrategy],
    pub endpoints: &'a [&'a str],
    pub params: &'a [(&'static str, String)],
}

/// The first combination that worked, with its decoded body
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub endpoint: String,
    pub auth_key: &'static str,
    pub auth_label: &'static str,
    pub json: Value,
}

/// Build `{base}{endpoint}?{params}` with form-encoded parameters
pub fn build_url(base_url: &str, endpoint: &str, params: &[(&'static str, String)]) -> String {
    if params.is_empty() {
        return format!("{}{}", base_url, endpoint);
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}{}?{}", base_url, endpoint, query)
}

/// Try every endpoint with every auth strategy, in order.
///
/// Returns on the first success. Failures of any kind are recorded and the
/// next combination is tried; if all fail the last recorded error is returned.
pub async fn try_endpoints(
    fetcher: &JsonFetcher,
    request: ProbeRequest<'_>,
) -> Result<ProbeResult, FetchError> {
    let mut last_error: Option<FetchError> = None;

    for endpoint in request.endpoints {
        let url = build_url(request.base_url, endpoint, request.params);

        for strategy in request.auth_strategies {
            tracing::debug!(url = %url, auth = strategy.label, "Probing");

            match fetcher.fetch_json(&url, &strategy.headers).await {
                Ok(json) => {
                    return Ok(ProbeResult {
                        endpoint: endpoint.to_string(),
                        auth_key: strategy.key,
                        auth_label: strategy.label,
                        json,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        url = %url,
                        auth = strategy.label,
                        status = ?e.status(),
                        error = %e,
                        "Probe failed"
                    );
                    last_error = Some(e);
                }
            }
        }
    }

    Err(last_error.unwrap_or(FetchError::Exhausted))
}
