//! Record Normalizer
//!
//! The remote API wraps lists in varying envelopes and names fields
//! inconsistently. Lookups here are table-driven: each logical field has an
//! ordered alias list and the first non-empty value wins.

use serde::Serialize;
use serde_json::Value;

/// Envelope keys that may hold the record list, in priority order
pub const ENVELOPE_KEYS: &[&str] = &["data", "people", "persons", "results", "items"];

pub const PERSON_ID_FIELDS: &[&str] = &["id", "person_id", "uuid", "_id"];
pub const PERSON_NAME_FIELDS: &[&str] = &["name"];
pub const PERSON_DISPLAY_NAME_FIELDS: &[&str] = &["display_name", "displayName", "full_name"];

pub const ENTRY_LABEL_FIELDS: &[&str] = &[
    "location_name",
    "locationName",
    "location",
    "project_name",
    "projectName",
    "project",
    "activity_name",
    "activityName",
    "activity",
    "task_name",
    "task",
    "title",
];
pub const ENTRY_TIME_IN_FIELDS: &[&str] =
    &["time_in", "timeIn", "start", "start_time", "startTime", "started_at"];
pub const ENTRY_TIME_OUT_FIELDS: &[&str] =
    &["time_out", "timeOut", "end", "end_time", "endTime", "ended_at"];

/// Nested objects contribute one of these as their text
const NESTED_TEXT_FIELDS: &[&str] = &["name", "title"];

/// Pull the record list out of a response body.
///
/// Arrays are returned as-is. Objects are searched through
/// [`ENVELOPE_KEYS`], descending into nested envelopes, and the first
/// non-empty list wins. Anything else yields an empty list.
pub fn extract_array(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => ENVELOPE_KEYS
            .iter()
            .filter_map(|key| map.remove(*key))
            .map(extract_array)
            .find(|items| !items.is_empty())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// First alias whose value is present: not null, not false, not a blank string
pub fn first_present<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| record.get(key))
        .find(|v| match v {
            Value::Null | Value::Bool(false) => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

/// First alias that renders as non-empty text
pub fn first_text(record: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(value_text)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => first_text(value, NESTED_TEXT_FIELDS),
        _ => None,
    }
}

fn full_name(record: &Value) -> Option<String> {
    let parts: Vec<String> = ["first_name", "last_name"]
        .iter()
        .filter_map(|key| record.get(key).and_then(value_text))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// A person as listed by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: String,
    pub name: String,
}

impl Person {
    /// Normalize a raw record. Records without any id are unusable and
    /// yield `None`.
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = first_text(record, PERSON_ID_FIELDS)?;
        let name = first_text(record, PERSON_NAME_FIELDS)
            .or_else(|| full_name(record))
            .or_else(|| first_text(record, PERSON_DISPLAY_NAME_FIELDS))
            .unwrap_or_else(|| "Unknown".to_string());

        Some(Self { id, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_array_shapes() {
        assert_eq!(extract_array(json!({"data": [1, 2]})), vec![json!(1), json!(2)]);
        assert_eq!(extract_array(json!([3, 4])), vec![json!(3), json!(4)]);
        assert!(extract_array(json!({})).is_empty());
        assert!(extract_array(Value::Null).is_empty());
        assert!(extract_array(json!("text")).is_empty());
        assert!(extract_array(json!([])).is_empty());
    }

    #[test]
    fn test_extract_array_priority_and_nesting() {
        let payload = json!({"items": [9], "results": [7], "data": []});
        assert_eq!(extract_array(payload), vec![json!(7)]);

        let nested = json!({"data": {"people": [{"id": 1}]}, "items": [0]});
        assert_eq!(extract_array(nested), vec![json!({"id": 1})]);

        assert!(extract_array(json!({"data": "nope", "meta": [1]})).is_empty());
    }

    #[test]
    fn test_first_present_skips_empty() {
        let record = json!({"a": null, "b": "  ", "c": false, "d": 0, "e": "x"});
        assert_eq!(first_present(&record, &["a", "b", "c", "d"]), Some(&json!(0)));
        assert_eq!(first_present(&record, &["a", "b", "e"]), Some(&json!("x")));
        assert_eq!(first_present(&record, &["missing"]), None);
    }

    #[test]
    fn test_first_text_reads_nested_names() {
        let record = json!({"project": {"id": 5, "name": "Warehouse"}});
        assert_eq!(first_text(&record, ENTRY_LABEL_FIELDS), Some("Warehouse".into()));
    }

    #[test]
    fn test_person_id_and_name_aliases() {
        let p = Person::from_record(&json!({"person_id": 42, "first_name": "Ada", "last_name": "Lovelace"})).unwrap();
        assert_eq!(p, Person { id: "42".into(), name: "Ada Lovelace".into() });

        let p = Person::from_record(&json!({"_id": "x", "display_name": "Grace"})).unwrap();
        assert_eq!(p.name, "Grace");

        let p = Person::from_record(&json!({"uuid": "u", "name": "", "last_name": "Hopper"})).unwrap();
        assert_eq!(p.name, "Hopper");

        let p = Person::from_record(&json!({"id": "z"})).unwrap();
        assert_eq!(p.name, "Unknown");

        assert!(Person::from_record(&json!({"name": "No Id"})).is_none());
    }
}
