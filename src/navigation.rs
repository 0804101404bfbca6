use std::sync::RwLock;

use tracing::{debug, warn};
use url::Url;

use crate::env::Environment;
use crate::error::SturlError;
use crate::options::NavigateOptions;

/// Client-side navigation, e.g. a router's `goto`.
///
/// Fire-and-forget: the implementation may finish asynchronously, and
/// failures are its own business.
pub trait Navigator: Send + Sync + 'static {
    fn navigate_to(&self, path: &str, options: &NavigateOptions);
}

/// Convenience: closures implement Navigator.
impl<F> Navigator for F
where
    F: Fn(&str, &NavigateOptions) + Send + Sync + 'static,
{
    fn navigate_to(&self, path: &str, options: &NavigateOptions) {
        (self)(path, options)
    }
}

/// In-memory browser history.
///
/// Resolves navigation paths against the current entry (so `"?a=1"`
/// keeps scheme, host and path and swaps the query), pushes a new entry
/// or replaces the current one when `replaceState` is set, and supports
/// back/forward. It also acts as a UI-hosted [`Environment`] whose
/// location is the current entry.
pub struct MemoryHistory {
    inner: RwLock<HistoryInner>,
}

struct HistoryInner {
    entries: Vec<Url>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new(start: Url) -> Self {
        Self {
            inner: RwLock::new(HistoryInner {
                entries: vec![start],
                cursor: 0,
            }),
        }
    }

    pub fn parse(start: &str) -> Result<Self, SturlError> {
        let url = Url::parse(start).map_err(|source| SturlError::InvalidUrl {
            input: start.to_string(),
            source,
        })?;
        Ok(Self::new(url))
    }

    /// The current entry.
    pub fn current(&self) -> Url {
        let inner = self.inner.read().unwrap();
        inner.entries[inner.cursor].clone()
    }

    /// All entries, oldest first, including any forward entries.
    pub fn entries(&self) -> Vec<Url> {
        self.inner.read().unwrap().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().entries.len()
    }

    /// Always false: history starts with one entry and never shrinks below it.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Push an entry, dropping anything forward of the cursor.
    pub fn push(&self, url: Url) {
        let mut inner = self.inner.write().unwrap();
        let keep = inner.cursor + 1;
        inner.entries.truncate(keep);
        inner.entries.push(url);
        inner.cursor += 1;
    }

    /// Overwrite the current entry.
    pub fn replace(&self, url: Url) {
        let mut inner = self.inner.write().unwrap();
        let cursor = inner.cursor;
        inner.entries[cursor] = url;
    }

    /// Step back one entry. Returns the new current entry, or `None` at
    /// the start of history.
    pub fn back(&self) -> Option<Url> {
        let mut inner = self.inner.write().unwrap();
        if inner.cursor == 0 {
            return None;
        }
        inner.cursor -= 1;
        Some(inner.entries[inner.cursor].clone())
    }

    /// Step forward one entry, if one exists.
    pub fn forward(&self) -> Option<Url> {
        let mut inner = self.inner.write().unwrap();
        if inner.cursor + 1 >= inner.entries.len() {
            return None;
        }
        inner.cursor += 1;
        Some(inner.entries[inner.cursor].clone())
    }
}

impl Navigator for MemoryHistory {
    fn navigate_to(&self, path: &str, options: &NavigateOptions) {
        let next = match self.current().join(path) {
            Ok(url) => url,
            Err(e) => {
                warn!(path, error = %e, "cannot resolve navigation path");
                return;
            }
        };
        debug!(url = %next, replace = options.replace_state(), "navigate");
        if options.replace_state() {
            self.replace(next);
        } else {
            self.push(next);
        }
    }
}

impl Environment for MemoryHistory {
    fn is_ui_hosted(&self) -> bool {
        true
    }

    fn current_location(&self) -> Option<Url> {
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn history() -> MemoryHistory {
        MemoryHistory::parse("https://example.com/search?q=a").unwrap()
    }

    // ========================================================================
    // Closure navigator
    // ========================================================================

    #[test]
    fn closure_is_a_navigator() {
        let calls = Arc::new(Mutex::new(Vec::<String>::new()));
        let calls_c = calls.clone();
        let nav = move |path: &str, _: &NavigateOptions| {
            calls_c.lock().unwrap().push(path.to_string());
        };

        nav.navigate_to("?x=1", &NavigateOptions::new());
        assert_eq!(*calls.lock().unwrap(), vec!["?x=1".to_string()]);
    }

    // ========================================================================
    // MemoryHistory
    // ========================================================================

    #[test]
    fn query_only_path_keeps_origin_and_path() {
        let h = history();
        h.navigate_to("?q=b&page=2", &NavigateOptions::new());
        assert_eq!(h.current().as_str(), "https://example.com/search?q=b&page=2");
    }

    #[test]
    fn empty_query_path() {
        let h = history();
        h.navigate_to("?", &NavigateOptions::new());
        assert_eq!(h.current().query(), Some(""));
    }

    #[test]
    fn push_adds_entry() {
        let h = history();
        h.navigate_to("?q=b", &NavigateOptions::new());
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn replace_state_overwrites_entry() {
        let h = history();
        h.navigate_to("?q=b", &NavigateOptions::new().with_replace_state(true));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current().query(), Some("q=b"));
    }

    #[test]
    fn back_and_forward() {
        let h = history();
        h.navigate_to("?q=b", &NavigateOptions::new());
        h.navigate_to("?q=c", &NavigateOptions::new());

        assert_eq!(h.back().unwrap().query(), Some("q=b"));
        assert_eq!(h.back().unwrap().query(), Some("q=a"));
        assert!(h.back().is_none());
        assert_eq!(h.forward().unwrap().query(), Some("q=b"));
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let h = history();
        h.navigate_to("?q=b", &NavigateOptions::new());
        h.back();
        h.navigate_to("?q=z", &NavigateOptions::new());

        let queries: Vec<String> = h
            .entries()
            .iter()
            .map(|u| u.query().unwrap_or("").to_string())
            .collect();
        assert_eq!(queries, vec!["q=a", "q=z"]);
        assert!(h.forward().is_none());
    }

    #[test]
    fn is_hosted_environment() {
        let h = history();
        assert!(h.is_ui_hosted());
        assert_eq!(h.current_location(), Some(h.current()));
    }

    #[test]
    fn parse_rejects_relative() {
        assert!(matches!(
            MemoryHistory::parse("/relative"),
            Err(SturlError::InvalidUrl { .. })
        ));
    }
}
