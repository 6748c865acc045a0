//! # Tally
//!
//! Daily work reports from a third-party time-tracking API whose base URL,
//! authentication scheme and resource paths are not known in advance.
//!
//! ## Features
//!
//! - **Adaptive discovery**: ordered probing of base URLs, auth header
//!   shapes, resource paths and query shapes; first success wins
//! - **Resilient calls**: per-attempt timeout, linear backoff, client
//!   errors never retried
//! - **Tolerant normalization**: envelopes and field names resolved through
//!   alias tables
//! - **Aggregation**: per-label grouping, worked time and shift balance
//!
//! ## Modules
//!
//! - [`discovery`]: candidate generators, resilient fetch, prober, orchestrator
//! - [`report`]: normalizer, aggregation engine, report service
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tally::config::DiscoveryConfig;
//! use tally::report::{ReportRequest, ReportService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ReportService::new(DiscoveryConfig::default())?;
//!
//!     let request = ReportRequest {
//!         api_key_id: Some("key-id".into()),
//!         api_key_secret: Some("key-secret".into()),
//!         date: Some("2024-03-04".into()),
//!         ..Default::default()
//!     };
//!
//!     let report = service.generate_report(&request).await?;
//!     for person in &report.reports {
//!         println!("{}: {}", person.name, person.total_formatted);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod discovery;
pub mod report;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, DiscoveryConfig, LoggingConfig};

pub use discovery::{
    AuthStrategy, DiscoveryContext, DiscoveryFailure, FetchError, JsonFetcher, ProbeResult,
    RetryPolicy,
};

pub use report::{
    DailyReport, GroupedEntry, Person, PersonReport, ReportError, ReportRequest, ReportService,
};
