use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::FieldError;
use crate::value::State;

/// A per-field validation rule.
///
/// Returns the (possibly coerced) value on success. Must not panic;
/// failures are reported as `Err`.
pub trait FieldValidator: Send + Sync + 'static {
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError>;
}

/// Convenience: closures implement FieldValidator.
impl<F> FieldValidator for F
where
    F: Fn(&Value) -> Result<Value, FieldError> + Send + Sync + 'static,
{
    fn attempt_validate(&self, value: &Value) -> Result<Value, FieldError> {
        (self)(value)
    }
}

/// Ordered set of named fields, each with its validator.
///
/// Acts as an allow-list: only declared fields ever make it through
/// [`validate`]. Cloning is cheap (validators are shared).
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(String, Arc<dyn FieldValidator>)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Re-declaring a name replaces its validator but
    /// keeps its original position.
    pub fn field(mut self, name: impl Into<String>, validator: impl FieldValidator) -> Self {
        let name = name.into();
        let validator: Arc<dyn FieldValidator> = Arc::new(validator);
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = validator,
            None => self.fields.push((name, validator)),
        }
        self
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn validate(&self, raw: &State, ignore_falsey: bool) -> State {
        validate(self, raw, ignore_falsey)
    }

    pub fn validate_detailed(&self, raw: &State, ignore_falsey: bool) -> Validated {
        validate_detailed(self, raw, ignore_falsey)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Result of [`validate_detailed`]: the accepted state plus the fields
/// whose validator said no.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    pub state: State,
    pub rejected: Vec<FieldRejection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRejection {
    pub field: String,
    pub error: FieldError,
}

/// Falsey in the JavaScript sense: `null`, `false`, zero, `""`.
///
/// The string `"0"` and empty arrays are truthy.
pub fn is_falsey(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// A one-element array is written to the URL as its lone item, so it is
/// as falsey as that item.
fn is_falsey_in_query(value: &Value) -> bool {
    match value {
        Value::Array(items) if items.len() == 1 => is_falsey(&items[0]),
        other => is_falsey(other),
    }
}

/// Validate `raw` against `schema`, silently dropping rejected fields.
///
/// Fields missing from `raw` are skipped. With `ignore_falsey`, falsey
/// values are treated as missing too, and so is a one-element array
/// holding a falsey item.
pub fn validate(schema: &Schema, raw: &State, ignore_falsey: bool) -> State {
    validate_detailed(schema, raw, ignore_falsey).state
}

/// Like [`validate`], but also reports which fields were rejected and why.
pub fn validate_detailed(schema: &Schema, raw: &State, ignore_falsey: bool) -> Validated {
    let mut out = Validated::default();

    for (name, validator) in &schema.fields {
        let Some(value) = raw.get(name) else {
            continue;
        };
        if ignore_falsey && is_falsey_in_query(value) {
            continue;
        }
        match validator.attempt_validate(value) {
            Ok(v) => {
                out.state.insert(name.clone(), v);
            }
            Err(error) => {
                debug!(field = %name, %error, "field rejected");
                out.rejected.push(FieldRejection {
                    field: name.clone(),
                    error,
                });
            }
        }
    }

    out
}
