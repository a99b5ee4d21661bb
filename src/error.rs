//! Error types used by the servitor runtime and managed services.
//!
//! This module defines:
//!
//! - [`ServiceError`] — errors raised by a service implementation itself
//!   (start, stop, hooks, reload).
//! - [`RuntimeError`] — errors raised by the orchestration layer, wrapping
//!   service failures with the name of the unit that produced them.
//! - [`MultiError`] — a thread-safe collector that merges zero or more
//!   [`RuntimeError`]s into a single aggregate value.
//!
//! Start-phase failures are fail-fast: the first error short-circuits and is
//! returned as-is. Stop- and reload-phase failures are exhaustive: every unit
//! is attempted and all failures end up in one [`RuntimeError::Aggregate`].

use std::fmt;
use std::sync::Mutex;

use thiserror::Error;

/// Errors produced by a service implementation.
///
/// These represent failures inside a single managed unit: a listener that
/// could not bind, a resource that failed to tear down, a hook that rejected
/// its configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Generic failure reported by a service implementation.
    #[error("{error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// I/O failure from a listener or owned resource.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Creates a generic failure from a message.
    ///
    /// # Example
    /// ```
    /// use servitor::ServiceError;
    ///
    /// let err = ServiceError::failed("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// ```
    pub fn failed(error: impl Into<String>) -> Self {
        ServiceError::Failed {
            error: error.into(),
        }
    }
}

/// Errors produced by the orchestration runtime.
///
/// Each variant records which unit (if any) the failure came from, so an
/// aggregate of many failures stays readable.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `start` was called on an empty registry.
    #[error("no services were registered")]
    NoServices,

    /// A service's start hook failed; its `start` was never called.
    #[error("start hook failed for {service}: {source}")]
    StartHook {
        /// Name of the service whose hook failed.
        service: String,
        /// The hook's error.
        source: ServiceError,
    },

    /// A service's `start` or `stop` returned an error.
    #[error("service {service} failed: {source}")]
    Service {
        /// Name of the failing service.
        service: String,
        /// The service's error.
        source: ServiceError,
    },

    /// A service's `reload` returned an error.
    #[error("reload failed for {service}: {source}")]
    Reload {
        /// Name of the service that failed to reload.
        service: String,
        /// The reload error.
        source: ServiceError,
    },

    /// A service's `stop` did not return within the fixed stop timeout.
    ///
    /// The underlying stop attempt is abandoned, not cancelled; its eventual
    /// result is unobservable.
    #[error("timed out waiting for {service} to stop")]
    StopTimeout {
        /// Name of the service that did not stop in time.
        service: String,
    },

    /// A runtime-level startup callback failed.
    #[error("{error}")]
    Callback {
        /// The callback's error message.
        error: String,
    },

    /// Reloading the shared configuration failed; no service was reloaded.
    #[error("configuration reload failed: {source}")]
    ConfigReload {
        /// The configuration collaborator's error.
        source: ServiceError,
    },

    /// One or more underlying failures collected by a [`MultiError`].
    #[error(transparent)]
    Aggregate(#[from] MultiError),
}

impl RuntimeError {
    /// Creates a runtime-callback failure from a message.
    ///
    /// Intended for user-supplied startup callbacks and bootstrap closures.
    pub fn callback(error: impl Into<String>) -> Self {
        RuntimeError::Callback {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use servitor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::NoServices.as_label(), "setup_no_services");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoServices => "setup_no_services",
            RuntimeError::StartHook { .. } => "start_hook_failed",
            RuntimeError::Service { .. } => "service_failed",
            RuntimeError::Reload { .. } => "reload_failed",
            RuntimeError::StopTimeout { .. } => "stop_timeout",
            RuntimeError::Callback { .. } => "callback_failed",
            RuntimeError::ConfigReload { .. } => "config_reload_failed",
            RuntimeError::Aggregate(_) => "aggregate",
        }
    }
}

/// Thread-safe collector of zero or more [`RuntimeError`]s.
///
/// Used by the stop and reload phases, where every unit is attempted
/// regardless of earlier failures and all errors must be preserved. A fresh
/// instance is created per invocation; it is not persisted.
///
/// Concurrent writers are safe: errors are appended under a lock and none is
/// ever dropped. The aggregate's message is every collected message joined by
/// newlines, in arrival order.
///
/// # Example
/// ```
/// use servitor::{MultiError, RuntimeError};
///
/// let faults = MultiError::new();
/// assert!(faults.into_result().is_ok());
///
/// let faults = MultiError::new();
/// faults.add(RuntimeError::NoServices);
/// let err = faults.into_result().unwrap_err();
/// assert_eq!(err.to_string(), "no services were registered");
/// ```
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Mutex<Vec<RuntimeError>>,
}

impl MultiError {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error. Safe for concurrent callers.
    pub fn add(&self, err: RuntimeError) {
        self.errors.lock().unwrap().push(err);
    }

    /// Records a result, appending the error if there is one.
    ///
    /// `Ok` is a no-op, mirroring "adding a nil error does nothing".
    pub fn record(&self, result: Result<(), RuntimeError>) {
        if let Err(err) = result {
            self.add(err);
        }
    }

    /// Returns the number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    /// Returns `true` if no error has been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the collector: `Ok(())` when empty, otherwise a single
    /// [`RuntimeError::Aggregate`] preserving every message.
    pub fn into_result(self) -> Result<(), RuntimeError> {
        let errors = self
            .errors
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::Aggregate(MultiError {
                errors: Mutex::new(errors),
            }))
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.lock().unwrap();
        let mut first = true;
        for err in errors.iter() {
            if !first {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_collector_yields_ok() {
        assert!(MultiError::new().into_result().is_ok());
    }

    #[test]
    fn test_record_ignores_ok() {
        let faults = MultiError::new();
        faults.record(Ok(()));
        assert!(faults.is_empty());
        assert!(faults.into_result().is_ok());
    }

    #[test]
    fn test_messages_joined_by_newlines_in_arrival_order() {
        let faults = MultiError::new();
        faults.add(RuntimeError::callback("first"));
        faults.add(RuntimeError::callback("second"));
        faults.add(RuntimeError::StopTimeout {
            service: "web".into(),
        });

        let err = faults.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "first\nsecond\ntimed out waiting for web to stop"
        );
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let faults = Arc::new(MultiError::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let faults = Arc::clone(&faults);
            handles.push(std::thread::spawn(move || {
                faults.add(RuntimeError::callback(format!("fault {i}")));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(faults.len(), 32);
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            RuntimeError::StopTimeout {
                service: "x".into()
            }
            .as_label(),
            "stop_timeout"
        );
        assert_eq!(
            RuntimeError::Service {
                service: "x".into(),
                source: ServiceError::failed("boom"),
            }
            .as_label(),
            "service_failed"
        );
        assert_eq!(RuntimeError::callback("x").as_label(), "callback_failed");
    }
}
