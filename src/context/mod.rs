//! # Application container: configuration, logging, and process metadata.
//!
//! [`Context`] is the read-only handle passed into service hooks and runtime
//! callbacks. It bundles the external collaborators the lifecycle core
//! consumes but does not own:
//!
//! - a [`Config`] for section/option lookup and in-place reload;
//! - a [`LogSink`] for log output (explicit value, never a rebound global);
//! - process metadata (name and version).
//!
//! The context is built once at boot and shared behind an `Arc` for the rest
//! of the process lifetime.

mod config;
mod log;

pub use config::{Config, MemoryConfig};
pub use log::{LogSink, TracingSink};

use std::fmt;
use std::sync::Arc;

/// Read access to configuration, logging, and process metadata.
///
/// # Example
/// ```
/// use servitor::Context;
///
/// let ctx = Context::with_defaults("spreed-app", "0.9.4");
/// assert_eq!(ctx.name(), "spreed-app");
/// assert_eq!(ctx.version(), "0.9.4");
/// ```
pub struct Context {
    name: String,
    version: String,
    config: Arc<dyn Config>,
    log: Arc<dyn LogSink>,
}

impl Context {
    /// Creates a context from explicit collaborators.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        config: Arc<dyn Config>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            config,
            log,
        }
    }

    /// Creates a context with an empty [`MemoryConfig`] and a
    /// [`TracingSink`].
    pub fn with_defaults(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(
            name,
            version,
            Arc::new(MemoryConfig::new()),
            Arc::new(TracingSink::new()),
        )
    }

    /// Returns the configured application name, or `"app"` if none was set.
    pub fn name(&self) -> &str {
        if self.name.is_empty() {
            "app"
        } else {
            &self.name
        }
    }

    /// Returns the configured version string, or `"unreleased"` if none was
    /// set.
    pub fn version(&self) -> &str {
        if self.version.is_empty() {
            "unreleased"
        } else {
            &self.version
        }
    }

    /// Returns the configuration collaborator.
    pub fn config(&self) -> &dyn Config {
        self.config.as_ref()
    }

    /// Writes one line to the logging sink.
    pub fn print(&self, message: impl AsRef<str>) {
        self.log.print(message.as_ref());
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name())
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink capturing lines for assertions.
    #[derive(Default)]
    pub(crate) struct CaptureSink {
        pub(crate) lines: Mutex<Vec<String>>,
    }

    impl LogSink for CaptureSink {
        fn print(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    #[test]
    fn test_name_uses_the_given_value() {
        let ctx = Context::with_defaults("spreed-app", "");
        assert_eq!(ctx.name(), "spreed-app");
    }

    #[test]
    fn test_name_defaults_to_app_if_unset() {
        let ctx = Context::with_defaults("", "");
        assert_eq!(ctx.name(), "app");
    }

    #[test]
    fn test_version_uses_the_given_value() {
        let ctx = Context::with_defaults("", "0.9.4b1");
        assert_eq!(ctx.version(), "0.9.4b1");
    }

    #[test]
    fn test_version_defaults_to_unreleased_if_unset() {
        let ctx = Context::with_defaults("", "");
        assert_eq!(ctx.version(), "unreleased");
    }

    #[test]
    fn test_print_writes_to_the_injected_sink() {
        let sink = Arc::new(CaptureSink::default());
        let ctx = Context::new("app", "1.0", Arc::new(MemoryConfig::new()), sink.clone());
        ctx.print("hello");
        assert_eq!(sink.lines.lock().unwrap().as_slice(), ["hello"]);
    }
}
