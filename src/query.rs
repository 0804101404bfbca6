//! Query-string codec.
//!
//! `parse_query` turns `tag=x&tag=y&q=hi` into `{tag: ["x", "y"], q: "hi"}`;
//! `serialize` goes the other way, re-expanding arrays into repeated keys.
//! Both use `application/x-www-form-urlencoded` rules.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;
use url::{Url, form_urlencoded};

use crate::value::{QueryValue, RawQuery, State};

/// Parse the query string of `url`. No URL means no parameters.
pub fn parse_query(url: Option<&Url>) -> RawQuery {
    match url.and_then(Url::query) {
        Some(query) => parse_query_str(query),
        None => RawQuery::new(),
    }
}

/// Parse a bare query string. A leading `?` is ignored.
///
/// Lenient: pairs without `=` get an empty value, invalid percent
/// escapes are kept literally, invalid UTF-8 is replaced.
pub fn parse_query_str(query: &str) -> RawQuery {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut raw = RawQuery::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match raw.entry(key.into_owned()) {
            Entry::Occupied(mut e) => e.get_mut().push(value.into_owned()),
            Entry::Vacant(e) => {
                e.insert(QueryValue::One(value.into_owned()));
            }
        }
    }
    raw
}

/// Serialize a state map to a query string (without the leading `?`).
///
/// Arrays become one pair per element under the same key, in order.
pub fn serialize(state: &State) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    for (key, value) in state {
        match value {
            Value::Array(items) => {
                for item in items {
                    out.append_pair(key, &scalar_text(item));
                }
            }
            other => {
                out.append_pair(key, &scalar_text(other));
            }
        }
    }
    out.finish()
}

/// Shallow copy of `obj` without `keys`. Remaining order is kept.
pub fn filter_out_keys<'a, V, I>(obj: &IndexMap<String, V>, keys: I) -> IndexMap<String, V>
where
    V: Clone,
    I: IntoIterator<Item = &'a str>,
{
    let mut out = obj.clone();
    for key in keys {
        out.shift_remove(key);
    }
    out
}

/// Text form of a single value, as it appears after `=`.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}
