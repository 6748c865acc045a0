//! Data Transfer Objects
//!
//! Response bodies owned by the HTTP layer. Report payloads themselves live
//! in [`crate::report::types`].

use serde::Serialize;

/// Error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable summary
    pub message: String,
    /// Last remote error seen during discovery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Base URLs tried during discovery, in order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried_base_urls: Option<Vec<String>>,
    /// Machine-readable error code
    pub code: String,
    pub request_id: String,
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "ok"
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
