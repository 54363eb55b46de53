//! Defensive field extraction over loosely-typed webhook payloads.
//!
//! BASTA renamed and nested fields several times across webhook revisions, so
//! every logical field is read from an ordered list of candidate paths. The
//! first candidate holding a usable value wins; callers substitute their own
//! default when none does.

use serde_json::{Number, Value};

/// Ordered candidate paths for one logical field. Dotted paths such as
/// `bidder.name` walk into nested objects.
pub type Candidates = &'static [&'static str];

/// Resolve a single dotted path, treating explicit `null` as absent.
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |value, key| value.get(key))
        .filter(|value| !value.is_null())
}

fn first<'a, T>(
    data: &'a Value,
    candidates: Candidates,
    convert: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    candidates
        .iter()
        .filter_map(|path| lookup(data, path))
        .find_map(convert)
}

/// First non-empty string.
pub fn first_str(data: &Value, candidates: Candidates) -> Option<String> {
    first(data, candidates, |value| match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// First identifier. Identifiers arrive either as strings or as numbers,
/// numbers are rendered as their decimal string.
pub fn first_id(data: &Value, candidates: Candidates) -> Option<String> {
    first(data, candidates, |value| match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First number, keeping its original JSON representation. Numeric strings
/// are accepted.
pub fn first_number(data: &Value, candidates: Candidates) -> Option<Number> {
    first(data, candidates, |value| match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => serde_json::from_str::<Number>(s.trim()).ok(),
        _ => None,
    })
}

/// First non-negative integer count.
pub fn first_count(data: &Value, candidates: Candidates) -> Option<u64> {
    first(data, candidates, |value| match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

pub fn first_bool(data: &Value, candidates: Candidates) -> Option<bool> {
    first(data, candidates, Value::as_bool)
}
