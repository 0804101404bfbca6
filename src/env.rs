use url::Url;

/// Where "the current URL" comes from when none is given explicitly.
pub trait Environment: Send + Sync + 'static {
    /// Whether a UI host (browser window, webview) is present.
    fn is_ui_hosted(&self) -> bool;

    /// The host's current location. Only consulted when
    /// `is_ui_hosted()` is true.
    fn current_location(&self) -> Option<Url>;
}

/// No UI host: there is never an ambient location.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Environment for Headless {
    fn is_ui_hosted(&self) -> bool {
        false
    }

    fn current_location(&self) -> Option<Url> {
        None
    }
}

/// The ambient location, or `None` outside a UI host.
pub fn ambient_location(env: &dyn Environment) -> Option<Url> {
    if env.is_ui_hosted() {
        env.current_location()
    } else {
        None
    }
}
