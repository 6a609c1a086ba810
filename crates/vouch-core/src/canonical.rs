//! Canonical JSON: sorted keys, no whitespace, applied recursively.
//!
//! `serde_json`'s default map type preserves insertion order unless the
//! `preserve_order` feature is disabled, so re-serializing through
//! `serde_json::Value` with its default `BTreeMap`-backed `Map` is enough
//! to get sorted keys at every nesting level, not just the top one.

use serde::Serialize;

use crate::error::{Result, VouchError};

/// Serializes `value` to its canonical JSON form: recursively sorted
/// object keys, no inserted whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let v = serde_json::to_value(value).map_err(VouchError::Serialization)?;
    let sorted = sort_value(v);
    serde_json::to_string(&sorted).map_err(VouchError::Serialization)
}

fn sort_value(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<String> = map.keys().cloned().collect();
            keys.sort();
            for k in keys {
                let v = map.get(&k).cloned().unwrap_or(Value::Null);
                sorted.insert(k, sort_value(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}
