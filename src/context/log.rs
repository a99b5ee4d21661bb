//! # Logging sink contract.
//!
//! The runtime never rebinds a global logger. Instead an explicit
//! [`LogSink`] value is threaded through the [`Context`](crate::Context),
//! injected once at boot. [`TracingSink`] is the default sink and forwards
//! lines to the `tracing` facade; tests typically substitute a capturing
//! sink.

/// Write-only logging sink.
///
/// Implementations must be cheap to call from concurrent tasks.
pub trait LogSink: Send + Sync {
    /// Writes one log line.
    fn print(&self, line: &str);
}

/// Default sink: forwards lines to `tracing` at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Constructs a new [`TracingSink`].
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn print(&self, line: &str) {
        tracing::info!(target: "servitor", "{}", line);
    }
}
