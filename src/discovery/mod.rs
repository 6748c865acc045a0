//! Endpoint and Auth Discovery
//!
//! The remote time-tracking API has no fixed address, auth scheme or
//! resource paths. This module guesses them by ordered, sequential probing:
//!
//! - [`candidates`]: base URL, auth strategy and query shape generators
//! - [`fetch`]: single GET with timeout and retry
//! - [`prober`]: endpoint × auth iteration with first success wins
//! - [`orchestrator`]: people phase and per-person time entry phase

pub mod candidates;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod prober;

pub use candidates::{
    build_auth_strategies, build_base_url_candidates, build_time_entry_param_sets,
    normalize_base_url, AuthStrategy, ParamSet, DEFAULT_BASE_URL,
};
pub use error::{sanitize_message, FetchError};
pub use fetch::{JsonFetcher, RetryPolicy};
pub use orchestrator::{
    discover_people, fetch_time_entries, DiscoveryContext, DiscoveryFailure, PeopleDiscovery,
    PEOPLE_ENDPOINTS, TIME_ENTRY_ENDPOINTS,
};
pub use prober::{try_endpoints, ProbeRequest, ProbeResult};
