//! Sturl: a schema-validated store bound to the URL query string.
//!
//! Reading: the current URL's query is parsed, checked field by field
//! against a [`Schema`], and the surviving fields become the store value.
//! Writing: `set(value)` validates, serializes to a query string, asks the
//! [`Navigator`] to go there, and publishes the validated value to
//! subscribers.
//!
//! # Query-string conventions
//!
//! - Standard `key=value&key2=value2`, form-urlencoded.
//! - A repeated key is a sequence: `tag=x&tag=y` is `{"tag": ["x", "y"]}`,
//!   and arrays serialize back the same way.
//! - Keys outside the schema are dropped, unless `passthrough` is on, in
//!   which case they are carried over (from the live URL) when writing.
//!
//! # Collaborators
//!
//! The store, the navigator and the "where am I" probe are traits
//! ([`Observable`], [`Navigator`], [`Environment`]). In-process versions
//! ship with the crate: [`Writable`], [`MemoryHistory`], [`Headless`].
//!
//! # Example
//!
//! ```ignore
//! use sturl::{MemoryHistory, Schema, Sturl, SturlOptions, validators::*};
//!
//! let history = Arc::new(MemoryHistory::parse("https://shop.dev/items?q=lamp&page=2&ref=ad")?);
//! let schema = Schema::new()
//!     .field("q", string())
//!     .field("page", number())
//!     .field("tag", list(string()));
//!
//! let sturl = Sturl::builder(schema, history.clone())
//!     .environment(history.clone())
//!     .options(SturlOptions::new().passthrough(true))
//!     .build()?;
//!
//! sturl.subscribe(|state| println!("{:?}", state));
//! sturl.set_typed(&json!({"q": "desk", "page": 1, "tag": ["oak", "pine"]}))?;
//! // history.current(): https://shop.dev/items?ref=ad&q=desk&page=1&tag=oak&tag=pine
//! ```

pub mod env;
pub mod error;
pub mod navigation;
pub mod options;
pub mod query;
pub mod schema;
pub mod store;
pub mod sturl;
pub mod validators;
pub mod value;

// Re-export primary types at crate root.
pub use env::{Environment, Headless};
pub use error::{FieldError, SturlError};
pub use navigation::{MemoryHistory, Navigator};
pub use options::{NavigateOptions, SturlOptions};
pub use query::{filter_out_keys, parse_query, parse_query_str, serialize};
pub use schema::{FieldRejection, FieldValidator, Schema, Validated, is_falsey, validate, validate_detailed};
pub use store::{Listener, Observable, Writable};
pub use sturl::{Sturl, SturlBuilder, create_sturl};
pub use value::{QueryValue, RawQuery, State, SubscriptionId};
