//! Application State
//!
//! Shared state accessible by all API handlers.
//! Holds no per-request discovery results; every report starts fresh.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::report::ReportService;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Report generator
    pub reports: Arc<ReportService>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(reports: ReportService, config: ApiConfig) -> Self {
        Self {
            reports: Arc::new(reports),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
