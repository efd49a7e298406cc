//! Parameter encoding for query strings, form bodies and JSON bodies.
//!
//! Nested parameters flatten to bracketed keys (`filter[kind]=a`,
//! `ids[0]=1`), booleans encode as `1`/`0`, and nulls are dropped, the way
//! most form-handling servers expect them.

use serde_json::{Map, Value};

use crate::error::TransportError;

/// URL-encode `params` as `key=value&key2=value2`.
pub fn urlencode(params: &Map<String, Value>) -> Result<String, TransportError> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten(key.clone(), value, &mut pairs);
    }
    serde_urlencoded::to_string(&pairs).map_err(|e| TransportError::Request(e.to_string()))
}

/// JSON-encode `params`. Unicode and `/` are written unescaped.
pub fn json(params: &Map<String, Value>) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(params).map_err(|e| TransportError::Request(e.to_string()))
}

/// Append an encoded query to `url`, respecting a query already present.
pub fn append_query(url: &mut String, query: &str) {
    if query.is_empty() {
        return;
    }
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(query);
}

fn flatten(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
        Value::String(s) => out.push((key, s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{key}[{index}]"), item, out);
            }
        }
        Value::Object(fields) => {
            for (name, field) in fields {
                flatten(format!("{key}[{name}]"), field, out);
            }
        }
    }
}
