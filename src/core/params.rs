//! Ordered parameter maps.
//!
//! Node parameters, query parameters and regex captures all share one
//! representation: a JSON object that keeps insertion order (`serde_json`
//! is built with `preserve_order`).

use serde_json::Value;
use url::form_urlencoded;

/// Ordered key → value parameter map.
pub type Parameters = serde_json::Map<String, Value>;

/// Build a parameter map from string pairs, keeping their order.
pub fn from_pairs<I, K, V>(pairs: I) -> Parameters
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect()
}

/// Merge `overrides` into `base`. Keys already in `base` keep their
/// position but take the overriding value; new keys are appended.
pub fn merge(base: &mut Parameters, overrides: &Parameters) {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
}

/// Render a parameter value the way it appears in a URL.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        other => other.to_string(),
    }
}

/// Encode parameters as an `application/x-www-form-urlencoded` query
/// string in insertion order. Nested arrays use `key[]` repetition.
pub fn to_query_string(params: &Parameters) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                let array_key = format!("{key}[]");
                for item in items {
                    serializer.append_pair(&array_key, &value_to_string(item));
                }
            }
            other => {
                serializer.append_pair(key, &value_to_string(other));
            }
        }
    }
    serializer.finish()
}

/// Parse a query string into parameters. Later duplicates win.
pub fn from_query_string(query: &str) -> Parameters {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

/// Parse a `key=value` CLI argument.
pub fn parse_pair(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{arg}`")),
    }
}
