//! Raw posting → [`Posting`] normalization.
//!
//! Upstream objects carry extra keys, omit others, and occasionally put the
//! wrong JSON type in a field. Normalization never fails: anything missing or
//! mistyped becomes the field's default.

use internwatch_shared::{Posting, RawPosting, Terms};
use serde_json::Value;

/// Map one raw object onto the fixed [`Posting`] shape.
pub fn normalize(raw: &RawPosting) -> Posting {
    Posting {
        category: string_field(raw, "category"),
        company_name: string_field(raw, "company_name"),
        id: string_field(raw, "id"),
        title: string_field(raw, "title"),
        active: matches!(raw.get("active"), Some(Value::Bool(true))),
        terms: terms_field(raw.get("terms")),
        date_updated: timestamp_field(raw.get("date_updated")),
        date_posted: timestamp_field(raw.get("date_posted")),
        url: string_field(raw, "url"),
        locations: string_list(raw.get("locations")),
        degrees: string_list(raw.get("degrees")),
    }
}

/// Normalize a whole collection, preserving order.
pub fn normalize_all(raw: &[RawPosting]) -> Vec<Posting> {
    raw.iter().map(normalize).collect()
}

fn string_field(raw: &RawPosting, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn terms_field(value: Option<&Value>) -> Terms {
    match value {
        Some(Value::String(s)) => Terms::Text(s.clone()),
        Some(Value::Array(items)) => Terms::List(strings(items)),
        _ => Terms::default(),
    }
}

fn timestamp_field(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => strings(items),
        _ => Vec::new(),
    }
}

/// String elements of a JSON array; other element types are dropped.
fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}
