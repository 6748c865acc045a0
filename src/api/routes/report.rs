//! Report Routes
//!
//! - POST /api/report - Generate the daily work report for one date

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::report::{DailyReport, ReportRequest};

/// POST /api/report
///
/// Discovers the remote API for the submitted credentials and returns one
/// report per person. Discovery state is not reused across calls.
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> ApiResult<Json<DailyReport>> {
    tracing::debug!(request = ?req, "Report requested");

    let report = state.reports.generate_report(&req).await?;

    tracing::info!(
        date = %report.date,
        people = report.people_count,
        base_url = %report.base_url,
        "Report served"
    );

    Ok(Json(report))
}
