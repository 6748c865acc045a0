//! Report request and response types
//!
//! Wire names are camelCase. Numeric request fields tolerate strings since
//! HTML forms submit everything as text.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::aggregate::PersonReport;
use crate::discovery::DiscoveryFailure;

/// Configuration for one report request, as submitted by the caller
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub api_key_id: Option<String>,
    #[serde(default)]
    pub api_key_secret: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub shift_hours: Option<f64>,
    #[serde(default)]
    pub auth_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub timeout_ms: Option<u64>,
}

impl fmt::Debug for ReportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportRequest")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &self.api_key_secret.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("date", &self.date)
            .field("shift_hours", &self.shift_hours)
            .field("auth_mode", &self.auth_mode)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.filter(|v| v.is_finite()))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.round() as u64))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// A request that passed boundary validation
#[derive(Clone)]
pub struct ReportParams {
    pub api_key_id: String,
    pub api_key_secret: String,
    pub base_url: Option<String>,
    /// Date as submitted, echoed back in the response
    pub date_label: String,
    pub date: NaiveDate,
    pub shift_minutes: i64,
    pub auth_mode: Option<String>,
    pub timeout: Option<Duration>,
}

impl ReportRequest {
    /// Check required fields and resolve defaults. No network access.
    pub fn validate(&self, default_shift_hours: f64) -> Result<ReportParams, ReportError> {
        let (Some(api_key_id), Some(api_key_secret)) =
            (non_empty(&self.api_key_id), non_empty(&self.api_key_secret))
        else {
            return Err(ReportError::Input(
                "Provide both the API Key ID and API Key Secret to continue.".into(),
            ));
        };

        let date_label = non_empty(&self.date)
            .ok_or_else(|| ReportError::Input("Please pick a date to run the report.".into()))?;
        let date = NaiveDate::parse_from_str(&date_label, "%Y-%m-%d").map_err(|_| {
            ReportError::Input(format!("Invalid date '{}', expected YYYY-MM-DD.", date_label))
        })?;

        Ok(ReportParams {
            api_key_id,
            api_key_secret,
            base_url: non_empty(&self.base_url),
            date_label,
            date,
            shift_minutes: shift_minutes(self.shift_hours, default_shift_hours),
            auth_mode: non_empty(&self.auth_mode),
            timeout: self.timeout_ms.map(Duration::from_millis),
        })
    }
}

/// Minutes in a shift; non-positive hours fall back to the default
pub fn shift_minutes(hours: Option<f64>, default_hours: f64) -> i64 {
    let hours = hours.filter(|h| h.is_finite() && *h > 0.0).unwrap_or(default_hours);
    (hours * 60.0).round() as i64
}

/// The report payload for one date
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: String,
    pub base_url: String,
    pub auth_strategy: String,
    pub people_endpoint: String,
    /// Endpoint that first returned entries for anyone
    pub entries_endpoint: Option<String>,
    pub people_count: usize,
    pub reports: Vec<PersonReport>,
}

/// Errors surfaced by report generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// Missing or malformed configuration; nothing was fetched
    #[error("{0}")]
    Input(String),

    /// No base URL produced a people listing
    #[error("Unable to fetch people from the time-tracking API. Check your base URL and API credentials.")]
    Discovery(#[from] DiscoveryFailure),

    /// Anything else that went wrong during the request
    #[error("Unable to fetch data from the time-tracking API: {0}")]
    Internal(String),
}
