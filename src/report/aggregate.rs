//! Aggregation Engine
//!
//! Groups one person's raw entries by label and derives worked time and
//! balance against the shift length.
//!
//! A group's `total_minutes` is the sum of its entries' durations, while
//! `time_in`/`time_out` are the outer bounds across those entries. The two
//! disagree when entries overlap or leave gaps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use super::normalize::{
    first_present, first_text, Person, ENTRY_LABEL_FIELDS, ENTRY_TIME_IN_FIELDS,
    ENTRY_TIME_OUT_FIELDS,
};

/// Label for entries without any label field
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

/// Rendering of an absent timestamp
pub const MISSING_TIME: &str = "-";

pub type Timestamp = DateTime<FixedOffset>;

/// ISO-8601 shapes RFC 3339 rejects: minute precision, `+HHMM` or `+HH` offsets
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_OF_DAY_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Parse a loosely formatted timestamp.
///
/// Accepts RFC 3339 and looser ISO-8601 offsets, naive date-times, bare
/// dates (midnight), bare times of day (placed on `date`) and epoch
/// milliseconds. Values without an offset are taken as
/// UTC wall-clock time. Anything else is `None`.
pub fn parse_time(value: &Value, date: NaiveDate) -> Option<Timestamp> {
    let utc = FixedOffset::east_opt(0)?;

    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.fixed_offset())
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt);
            }
            if let Some(dt) = OFFSET_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
            {
                return Some(dt);
            }
            let naive = NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .or_else(|| {
                    TIME_OF_DAY_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
                        .map(|t| date.and_time(t))
                })?;
            utc.from_local_datetime(&naive).single()
        }
        _ => None,
    }
}

/// Whole minutes from `start` to `end`, rounded, never negative.
/// Zero when either side is missing.
pub fn minutes_between(start: Option<Timestamp>, end: Option<Timestamp>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => {
            let seconds = (end - start).num_seconds() as f64;
            ((seconds / 60.0).round() as i64).max(0)
        }
        _ => 0,
    }
}

/// `"{hours}h {minutes:02}m"`; negative input renders as zero
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// `HH:MM:SS` in the timestamp's own offset, or [`MISSING_TIME`]
pub fn format_time(time: Option<Timestamp>) -> String {
    time.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| MISSING_TIME.to_string())
}

/// One raw entry resolved through the alias tables
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub label: String,
    pub time_in: Option<Timestamp>,
    pub time_out: Option<Timestamp>,
}

impl TimeEntry {
    pub fn from_record(record: &Value, date: NaiveDate) -> Self {
        let time = |aliases: &[&str]| first_present(record, aliases).and_then(|v| parse_time(v, date));

        Self {
            label: first_text(record, ENTRY_LABEL_FIELDS)
                .unwrap_or_else(|| UNSPECIFIED_LABEL.to_string()),
            time_in: time(ENTRY_TIME_IN_FIELDS),
            time_out: time(ENTRY_TIME_OUT_FIELDS),
        }
    }

    pub fn minutes(&self) -> i64 {
        minutes_between(self.time_in, self.time_out)
    }
}

/// Per-label aggregation of one person's entries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedEntry {
    pub property: String,
    pub time_in: Option<Timestamp>,
    pub time_out: Option<Timestamp>,
    pub total_minutes: i64,
    pub time_in_formatted: String,
    pub time_out_formatted: String,
    pub total_formatted: String,
}

impl GroupedEntry {
    fn new(property: String) -> Self {
        Self {
            property,
            time_in: None,
            time_out: None,
            total_minutes: 0,
            time_in_formatted: MISSING_TIME.to_string(),
            time_out_formatted: MISSING_TIME.to_string(),
            total_formatted: format_duration(0),
        }
    }

    fn absorb(&mut self, entry: &TimeEntry) {
        self.time_in = match (self.time_in, entry.time_in) {
            (Some(current), Some(new)) => Some(current.min(new)),
            (current, new) => current.or(new),
        };
        self.time_out = match (self.time_out, entry.time_out) {
            (Some(current), Some(new)) => Some(current.max(new)),
            (current, new) => current.or(new),
        };
        self.total_minutes += entry.minutes();
    }

    fn finish(mut self) -> Self {
        self.time_in_formatted = format_time(self.time_in);
        self.time_out_formatted = format_time(self.time_out);
        self.total_formatted = format_duration(self.total_minutes);
        self
    }
}

/// Group entries by label, in order of first appearance
pub fn group_entries(entries: &[TimeEntry]) -> Vec<GroupedEntry> {
    let mut groups: Vec<GroupedEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        let slot = *index.entry(entry.label.as_str()).or_insert_with(|| {
            groups.push(GroupedEntry::new(entry.label.clone()));
            groups.len() - 1
        });
        groups[slot].absorb(entry);
    }

    groups.into_iter().map(GroupedEntry::finish).collect()
}

/// Daily report for one person
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonReport {
    pub id: String,
    pub name: String,
    pub grouped_entries: Vec<GroupedEntry>,
    pub total_minutes: i64,
    pub balance_minutes: i64,
    pub total_formatted: String,
    pub balance_formatted: String,
}

/// Shift length minus worked time, never below zero
pub fn balance_minutes(shift_minutes: i64, total_minutes: i64) -> i64 {
    (shift_minutes - total_minutes).max(0)
}

/// Assemble a person's report from their raw entry records
pub fn build_person_report(
    person: &Person,
    records: &[Value],
    date: NaiveDate,
    shift_minutes: i64,
) -> PersonReport {
    let entries: Vec<TimeEntry> = records
        .iter()
        .map(|r| TimeEntry::from_record(r, date))
        .collect();
    let grouped_entries = group_entries(&entries);

    let total_minutes = grouped_entries.iter().map(|g| g.total_minutes).sum::<i64>().max(0);
    let balance = balance_minutes(shift_minutes, total_minutes);

    PersonReport {
        id: person.id.clone(),
        name: person.name.clone(),
        grouped_entries,
        total_minutes,
        balance_minutes: balance,
        total_formatted: format_duration(total_minutes),
        balance_formatted: format_duration(balance),
    }
}
