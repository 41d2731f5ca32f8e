use serde_json::{Map, Value};

/// Restrict `data` to `keys`, silently omitting keys that are absent.
///
/// The result preserves the order keys were requested in, which downstream
/// tables rely on for row ordering. A missing key is not an error at this
/// level; domain code decides whether an empty result is fatal.
pub fn subdict(data: &Map<String, Value>, keys: &[&str]) -> Vec<(String, Value)> {
    keys.iter()
        .filter_map(|&k| data.get(k).map(|v| (k.to_string(), v.clone())))
        .collect()
}

/// Walk `value` down a chain of object keys, returning the reached node.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = value;
    for &key in path {
        cur = cur.get(key)?;
    }
    Some(cur)
}

/// Unwrap a `{"raw": x, "fmt": "..."}` envelope, returning the raw scalar.
///
/// Yahoo wraps most numeric fields this way when formatting is requested;
/// any other value passes through untouched, so call sites do not need to
/// know which representation they were handed.
#[must_use]
pub fn raw_value(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("raw").unwrap_or(value),
        _ => value,
    }
}
