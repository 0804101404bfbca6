use std::mem;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated, schema-shaped state. Keys keep insertion order, which is
/// schema declaration order for anything produced by `validate`.
pub type State = IndexMap<String, Value>;

/// Raw key/value view of a query string, before any validation.
pub type RawQuery = IndexMap<String, QueryValue>;

/// The value(s) a query-string key carried.
///
/// A key seen once is `One`; a repeated key is `Many`, in the order the
/// occurrences appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// Record another occurrence of the same key.
    pub fn push(&mut self, value: String) {
        match self {
            QueryValue::One(first) => {
                let first = mem::take(first);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }

    /// All occurrences, in order.
    pub fn values(&self) -> &[String] {
        match self {
            QueryValue::One(v) => std::slice::from_ref(v),
            QueryValue::Many(vs) => vs,
        }
    }

    /// First occurrence.
    pub fn first(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    pub fn is_many(&self) -> bool {
        matches!(self, QueryValue::Many(_))
    }
}

impl From<QueryValue> for Value {
    fn from(value: QueryValue) -> Self {
        match value {
            QueryValue::One(v) => Value::String(v),
            QueryValue::Many(vs) => Value::Array(vs.into_iter().map(Value::String).collect()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::One(value.to_string())
    }
}

/// Convert a raw query into the generic value map validators consume.
pub fn raw_to_state(raw: RawQuery) -> State {
    raw.into_iter().map(|(k, v)| (k, v.into())).collect()
}

/// Unique handle for a subscription, returned by `Observable::subscribe()`.
///
/// Use this to unsubscribe later via `Observable::unsubscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
