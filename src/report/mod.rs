//! Daily Work Reports
//!
//! Turns raw people and time entry payloads into per-person reports.
//!
//! - [`normalize`]: envelope unwrapping and alias-driven field lookup
//! - [`aggregate`]: grouping, durations, balance, formatting
//! - [`types`]: request/response payloads and the report error taxonomy
//! - [`service`]: the end-to-end `generate_report` operation

pub mod aggregate;
pub mod normalize;
pub mod service;
pub mod types;

pub use aggregate::{
    balance_minutes, build_person_report, format_duration, format_time, group_entries,
    minutes_between, parse_time, GroupedEntry, PersonReport, TimeEntry, UNSPECIFIED_LABEL,
};
pub use normalize::{extract_array, first_present, first_text, Person};
pub use service::ReportService;
pub use types::{shift_minutes, DailyReport, ReportError, ReportParams, ReportRequest};
