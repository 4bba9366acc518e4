//! Deterministic cache key derivation
//!
//! Two logically identical requests must always map to the same key, so
//! both the query parameters and the JSON body are canonicalized before
//! they enter the key: query pairs are sorted, and object keys are
//! sorted recursively at every nesting level. Any difference in content
//! yields a different key.

use serde_json::Value;

/// Caller identity used when no authenticated user is attached
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// Derive the cache key for a request
///
/// Shape: `METHOD:path:identity?sorted-query#canonical-body`, where the
/// query and body segments are omitted when empty.
pub fn derive_key(
    method: &str,
    path: &str,
    identity: &str,
    query: &[(String, String)],
    body: Option<&Value>,
) -> String {
    let mut key = format!("{}:{}:{}", method.to_ascii_uppercase(), path, identity);

    if !query.is_empty() {
        let mut pairs: Vec<&(String, String)> = query.iter().collect();
        pairs.sort();
        let joined: Vec<String> = pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        key.push('?');
        key.push_str(&joined.join("&"));
    }

    if let Some(body) = body {
        key.push('#');
        key.push_str(&canonical_json(body));
    }

    key
}

/// Render a JSON value with recursively sorted object keys
///
/// The output is deterministic regardless of the key order the value was
/// built or parsed with.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&fields[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
