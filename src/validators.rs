//! Built-in field validators.
//!
//! Query strings only carry text, so the numeric and boolean validators
//! coerce from strings as well as accepting already-typed JSON values.
//! Anything fancier can be a closure:
//!
//! ```ignore
//! let schema = Schema::new().field("slug", |v: &Value| match v.as_str() {
//!     Some(s) if !s.contains('/') => Ok(v.clone()),
//!     _ => Err(FieldError::new("bad slug")),
//! });
//! ```

use serde_json::{Number, Value};

use crate::error::FieldError;
use crate::schema::FieldValidator;

/// Largest integer an f64 can hold exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn string() -> StringField {
    StringField
}

pub fn number() -> NumberField {
    NumberField
}

pub fn integer() -> IntegerField {
    IntegerField
}

pub fn boolean() -> BooleanField {
    BooleanField
}

pub fn one_of<I, S>(allowed: I) -> OneOf
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    OneOf(allowed.into_iter().map(Into::into).collect())
}

pub fn list<V: FieldValidator>(inner: V) -> List<V> {
    List(inner)
}

// ── string ──

#[derive(Debug, Clone, Copy, Default)]
pub struct StringField;

impl FieldValidator for StringField {
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError> {
        match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(expected("string", other)),
        }
    }
}

// ── number ──

/// Any finite number. Integral results come out as JSON integers, so
/// `"3"` serializes back as `3`, not `3.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberField;

impl FieldValidator for NumberField {
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError> {
        if let Some(n) = exact_integer(value) {
            return Ok(n);
        }
        let f = to_f64(value)?;
        if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
            return Ok(Value::from(f as i64));
        }
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| FieldError::new("expected finite number"))
    }
}

// ── integer ──

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerField;

impl FieldValidator for IntegerField {
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError> {
        if let Some(n) = exact_integer(value) {
            return Ok(n);
        }
        let f = to_f64(value)?;
        if f.fract() != 0.0 || f.abs() >= MAX_SAFE_INTEGER {
            return Err(FieldError::new(format!("expected integer, got {}", f)));
        }
        Ok(Value::from(f as i64))
    }
}

// ── boolean ──

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanField;

impl FieldValidator for BooleanField {
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s == "true" => Ok(Value::Bool(true)),
            Value::String(s) if s == "false" => Ok(Value::Bool(false)),
            other => Err(expected("boolean", other)),
        }
    }
}

// ── one_of ──

#[derive(Debug, Clone, Default)]
pub struct OneOf(Vec<String>);

impl FieldValidator for OneOf {
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError> {
        match value.as_str() {
            Some(s) if self.0.iter().any(|a| a == s) => Ok(value.clone()),
            _ => Err(FieldError::new(format!(
                "expected one of {:?}, got {}",
                self.0, value
            ))),
        }
    }
}

// ── list ──

/// Sequence field. A lone scalar counts as a one-element list, since a
/// key that appears once in the URL parses as a plain string. Empty
/// lists are rejected: repeated keys cannot spell zero occurrences.
#[derive(Debug, Clone, Default)]
pub struct List<V>(V);

impl<V: FieldValidator> FieldValidator for List<V> {
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError> {
        match value {
            Value::Array(items) if items.is_empty() => {
                Err(FieldError::new("expected non-empty list"))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.0
                        .attempt_validate(item)
                        .map_err(|e| FieldError::new(format!("item {}: {}", i, e)))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            single => Ok(Value::Array(vec![self.0.attempt_validate(single)?])),
        }
    }
}

/// Integer reading that never goes through `f64`: JSON integers as they
/// are, strings that parse as `i64` or `u64`.
fn exact_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::from)
                .or_else(|_| s.parse::<u64>().map(Value::from))
                .ok()
        }
        _ => None,
    }
}

fn to_f64(value: &Value) -> Result<f64, FieldError> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match f {
        Some(f) if f.is_finite() => Ok(f),
        _ => Err(expected("number", value)),
    }
}

fn expected(kind: &str, got: &Value) -> FieldError {
    FieldError::new(format!("expected {}, got {}", kind, got))
}
