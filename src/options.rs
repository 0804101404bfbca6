use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SturlError;

/// Options for a [`Sturl`](crate::Sturl).
///
/// Deserializes from the same camelCase object callers would hand to a
/// client-side `goto`: `ignoreFalsey` and `passthrough` are ours, every
/// other key lands in [`NavigateOptions`] and is forwarded untouched.
///
/// ```ignore
/// let opts = SturlOptions::from_json(r#"{"passthrough": true, "replaceState": true}"#)?;
/// assert!(opts.navigation.replace_state());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SturlOptions {
    /// Treat `""`, `0`, `false` and `null` as absent.
    #[serde(default)]
    pub ignore_falsey: bool,
    /// Keep query keys outside the schema when writing the URL.
    #[serde(default)]
    pub passthrough: bool,
    #[serde(flatten)]
    pub navigation: NavigateOptions,
}

impl SturlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SturlError> {
        serde_json::from_str(json).map_err(SturlError::Options)
    }

    pub fn ignore_falsey(mut self, on: bool) -> Self {
        self.ignore_falsey = on;
        self
    }

    pub fn passthrough(mut self, on: bool) -> Self {
        self.passthrough = on;
        self
    }

    pub fn navigation(mut self, navigation: NavigateOptions) -> Self {
        self.navigation = navigation;
        self
    }
}

/// Opaque navigation options, passed verbatim to the navigator.
///
/// The helpers cover the keys a history-backed navigator typically
/// understands; anything else goes through `insert`/`get`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigateOptions(Map<String, Value>);

impl NavigateOptions {
    const REPLACE_STATE: &'static str = "replaceState";
    const NO_SCROLL: &'static str = "noScroll";
    const KEEP_FOCUS: &'static str = "keepFocus";
    const INVALIDATE_ALL: &'static str = "invalidateAll";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn with_replace_state(self, on: bool) -> Self {
        self.insert(Self::REPLACE_STATE, on)
    }

    pub fn with_no_scroll(self, on: bool) -> Self {
        self.insert(Self::NO_SCROLL, on)
    }

    pub fn with_keep_focus(self, on: bool) -> Self {
        self.insert(Self::KEEP_FOCUS, on)
    }

    pub fn with_invalidate_all(self, on: bool) -> Self {
        self.insert(Self::INVALIDATE_ALL, on)
    }

    /// Replace the current history entry instead of pushing a new one.
    pub fn replace_state(&self) -> bool {
        self.flag(Self::REPLACE_STATE)
    }

    pub fn no_scroll(&self) -> bool {
        self.flag(Self::NO_SCROLL)
    }

    pub fn keep_focus(&self) -> bool {
        self.flag(Self::KEEP_FOCUS)
    }

    pub fn invalidate_all(&self) -> bool {
        self.flag(Self::INVALIDATE_ALL)
    }

    fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}
