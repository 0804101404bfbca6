use thiserror::Error;

#[derive(Error, Debug)]
pub enum SturlError {
    #[error("invalid url {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid options: {0}")]
    Options(#[source] serde_json::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("value does not serialize to an object")]
    NotAnObject,
}

/// Why a single field was rejected by its validator.
///
/// Never escapes [`validate`](crate::schema::validate); the field is
/// dropped instead. Surfaced only through
/// [`validate_detailed`](crate::schema::validate_detailed).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
