use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::env::{Environment, Headless, ambient_location};
use crate::error::SturlError;
use crate::navigation::Navigator;
use crate::options::SturlOptions;
use crate::query::{filter_out_keys, parse_query, serialize};
use crate::schema::Schema;
use crate::store::{Observable, Writable};
use crate::value::{RawQuery, State, SubscriptionId, raw_to_state};

type StoreFactory = Box<dyn FnOnce(State) -> Arc<dyn Observable<State>>>;

/// A store bound to the URL query string.
///
/// - `get()` / `subscribe(listener)`: read the validated, schema-shaped state
/// - `set(value)`: validate, write the URL (via the navigator), publish
/// - `to_query_string()`: project the live URL through the schema
///
/// # Examples
///
/// ```ignore
/// let schema = Schema::new().field("q", string()).field("page", number());
/// let history = Arc::new(MemoryHistory::parse("https://x.dev/?q=hello&page=2")?);
///
/// let sturl = Sturl::builder(schema, history.clone())
///     .environment(history.clone())
///     .build()?;
/// assert_eq!(sturl.get()["page"], json!(2));
///
/// sturl.set(state(json!({"q": "world", "page": 3})));
/// assert_eq!(history.current().query(), Some("q=world&page=3"));
/// ```
pub struct Sturl {
    schema: Schema,
    options: SturlOptions,
    /// Explicit construction URL, if any.
    url: Option<Url>,
    store: Arc<dyn Observable<State>>,
    navigator: Arc<dyn Navigator>,
    env: Arc<dyn Environment>,
}

impl Sturl {
    pub fn builder(schema: Schema, navigator: Arc<dyn Navigator>) -> SturlBuilder {
        SturlBuilder {
            schema,
            navigator,
            url: None,
            options: SturlOptions::default(),
            env: Arc::new(Headless),
            store: None,
        }
    }

    // ====================================================================
    // Read
    // ====================================================================

    /// Current validated state.
    pub fn get(&self) -> State {
        self.store.get()
    }

    /// Current state deserialized into `T`.
    pub fn get_typed<T: DeserializeOwned>(&self) -> Result<T, SturlError> {
        let object = self.get().into_iter().collect();
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Subscribe to state changes. The listener is called immediately with
    /// the current state, then after every `set`.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&State) + Send + Sync + 'static,
    {
        self.store.subscribe(Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }

    // ====================================================================
    // Write
    // ====================================================================

    /// Validate `value`, navigate to the resulting query string, then
    /// publish the validated state.
    ///
    /// With `passthrough`, query keys outside the schema are read from the
    /// live URL and kept in the navigation target. Subscribers only ever
    /// see schema fields.
    pub fn set(&self, value: State) {
        let unrelated = if self.options.passthrough {
            let live = self.live_query();
            let unrelated = filter_out_keys(&live, self.schema.names());
            trace!(keys = ?unrelated.keys().collect::<Vec<_>>(), "passthrough snapshot");
            Some(unrelated)
        } else {
            None
        };

        let validated = self.schema.validate(&value, self.options.ignore_falsey);

        let query = match unrelated {
            Some(unrelated) => {
                let mut merged = raw_to_state(unrelated);
                merged.extend(validated.iter().map(|(k, v)| (k.clone(), v.clone())));
                serialize(&merged)
            }
            None => serialize(&validated),
        };

        debug!(%query, fields = validated.len(), "sturl set");
        self.navigator
            .navigate_to(&format!("?{}", query), &self.options.navigation);
        self.store.set(validated);
    }

    /// Serialize `value` and `set` it. `value` must serialize to an object.
    pub fn set_typed<T: Serialize>(&self, value: &T) -> Result<(), SturlError> {
        match serde_json::to_value(value)? {
            Value::Object(object) => {
                self.set(object.into_iter().collect());
                Ok(())
            }
            _ => Err(SturlError::NotAnObject),
        }
    }

    /// The live URL's schema fields as a query string. Passthrough keys
    /// are not included. No side effects.
    pub fn to_query_string(&self) -> String {
        let raw = raw_to_state(self.live_query());
        serialize(&self.schema.validate(&raw, self.options.ignore_falsey))
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &SturlOptions {
        &self.options
    }

    /// The URL's query as it is right now: the host location when one is
    /// present, else the construction URL.
    fn live_query(&self) -> RawQuery {
        let location = ambient_location(self.env.as_ref()).or_else(|| self.url.clone());
        parse_query(location.as_ref())
    }
}

/// Builder for [`Sturl`]. Defaults: no explicit URL, default options,
/// [`Headless`] environment, [`Writable`] store.
pub struct SturlBuilder {
    schema: Schema,
    navigator: Arc<dyn Navigator>,
    url: Option<String>,
    options: SturlOptions,
    env: Arc<dyn Environment>,
    store: Option<StoreFactory>,
}

impl SturlBuilder {
    /// Read the initial state from this absolute URL instead of the
    /// environment's location.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn options(mut self, options: SturlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn environment(mut self, env: Arc<dyn Environment>) -> Self {
        self.env = env;
        self
    }

    /// Use a custom store, created from the initial state.
    pub fn store<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(State) -> Arc<dyn Observable<State>> + 'static,
    {
        self.store = Some(Box::new(factory));
        self
    }

    /// Parse the URL, validate the initial state and create the store.
    ///
    /// Fails only if an explicit URL is not a valid absolute URL.
    pub fn build(self) -> Result<Sturl, SturlError> {
        let url = self
            .url
            .map(|input| {
                Url::parse(&input).map_err(|source| SturlError::InvalidUrl { input, source })
            })
            .transpose()?;

        let location = url.clone().or_else(|| ambient_location(self.env.as_ref()));
        let raw = raw_to_state(parse_query(location.as_ref()));
        let initial = self.schema.validate(&raw, self.options.ignore_falsey);
        debug!(
            schema = ?self.schema,
            initial = ?initial.keys().collect::<Vec<_>>(),
            "sturl created"
        );

        let store: Arc<dyn Observable<State>> = match self.store {
            Some(factory) => factory(initial),
            None => Arc::new(Writable::new(initial)),
        };

        Ok(Sturl {
            schema: self.schema,
            options: self.options,
            url,
            store,
            navigator: self.navigator,
            env: self.env,
        })
    }
}

/// Create a [`Sturl`] in one call.
///
/// `url` overrides the environment's location for the initial state.
pub fn create_sturl(
    schema: Schema,
    url: Option<&str>,
    options: SturlOptions,
    navigator: Arc<dyn Navigator>,
    env: Arc<dyn Environment>,
) -> Result<Sturl, SturlError> {
    let mut builder = Sturl::builder(schema, navigator)
        .options(options)
        .environment(env);
    if let Some(url) = url {
        builder = builder.url(url);
    }
    builder.build()
}
