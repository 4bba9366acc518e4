//! Structural payload transformation
//!
//! [`transform`] reshapes an arbitrary JSON payload according to an
//! [`AdaptationStrategy`]. It is total and pure: it never fails, never
//! mutates its input, and treats every JSON shape uniformly through
//! structural recursion. Faults inside individual rules (a malformed
//! image URL, an unparseable date) are recovered locally by leaving the
//! original value in place.
//!
//! Applying the transform twice with the same strategy yields the same
//! result as applying it once.

use crate::strategy::AdaptationStrategy;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use url::Url;

/// Internal fields stripped from every object before it leaves the BFF
const INTERNAL_FIELDS: &[&str] = &["internalId", "debugInfo", "rawData", "_internal"];

/// Minimum polling interval in milliseconds when polling is reduced
const REDUCED_POLLING_FLOOR_MS: u64 = 5000;

/// Transform a JSON payload according to the given strategy
pub fn transform(data: &Value, strategy: &AdaptationStrategy) -> Value {
    match data {
        Value::Array(items) => {
            let limit = if strategy.enable_pagination {
                strategy.page_size.min(items.len())
            } else {
                items.len()
            };
            Value::Array(
                items[..limit]
                    .iter()
                    .map(|item| transform(item, strategy))
                    .collect(),
            )
        }
        Value::Object(fields) => Value::Object(transform_object(fields, strategy)),
        scalar => scalar.clone(),
    }
}

fn transform_object(fields: &Map<String, Value>, strategy: &AdaptationStrategy) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in fields {
        if INTERNAL_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if strategy.omit_null_values && value.is_null() {
            continue;
        }

        let transformed = match value {
            Value::String(s) if is_image_url_field(key) => {
                Value::String(rewrite_image_url(s, strategy))
            }
            Value::String(s) if is_date_field(key) => match parse_date_millis(s) {
                Some(millis) => Value::Number(millis.into()),
                None => value.clone(),
            },
            Value::Bool(_) if key == "animations" && strategy.disable_animations => {
                Value::Bool(false)
            }
            Value::Bool(_) if key == "backgroundSync" && strategy.disable_background_sync => {
                Value::Bool(false)
            }
            Value::Number(n) if key == "pollingInterval" && strategy.reduce_polling_frequency => {
                match n.as_u64() {
                    Some(ms) => Value::Number(ms.max(REDUCED_POLLING_FLOOR_MS).into()),
                    None => value.clone(),
                }
            }
            nested => transform(nested, strategy),
        };

        out.insert(key.clone(), transformed);
    }

    out
}

/// Fields conventionally carrying an image URL
fn is_image_url_field(key: &str) -> bool {
    matches!(key, "imageUrl" | "avatarUrl" | "thumbnailUrl") || key.ends_with("ImageUrl")
}

/// Fields conventionally carrying a date or timestamp
fn is_date_field(key: &str) -> bool {
    matches!(key, "timestamp" | "date") || key.ends_with("At") || key.ends_with("Date")
}

/// Rewrite an image URL with the strategy's quality and width budgets
///
/// Existing `quality`/`width` parameters are overwritten. When the URL
/// does not parse, the original string is returned untouched.
fn rewrite_image_url(raw: &str, strategy: &AdaptationStrategy) -> String {
    let mut parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    let retained: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(name, _)| name != "quality" && name != "width")
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = parsed.query_pairs_mut();
        pairs.clear();
        for (name, value) in &retained {
            pairs.append_pair(name, value);
        }
        pairs.append_pair("quality", &strategy.image_quality.to_string());
        pairs.append_pair("width", &strategy.max_image_width.to_string());
    }

    parsed.to_string()
}

/// Parse a date-like string into epoch milliseconds
///
/// Accepts RFC 3339 first, then `YYYY-MM-DD HH:MM:SS`, then `YYYY-MM-DD`
/// (midnight UTC). Returns `None` for anything else.
fn parse_date_millis(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt).timestamp_millis());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let dt = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&dt).timestamp_millis());
    }

    None
}
